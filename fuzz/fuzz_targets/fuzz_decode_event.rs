#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed frames are text; non-UTF-8 input can't reach the decoder
    if let Ok(raw) = std::str::from_utf8(data) {
        // Decode must reject bad frames without panicking
        let _ = argus::event::decode(raw);
    }
});
