//! Typed models for the reservation REST API
//!
//! Field names mirror the backend's JSON (camelCase) via serde renames.

use crate::event::{OwnerRef, StationInfo, VehicleInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account on the reservation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// A registered vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub plate_number: String,
    pub battery_capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
}

/// A charging station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub number_of_pumps: u32,
}

/// Payload for creating or updating a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    pub make: String,
    pub model: String,
    pub plate_number: String,
    pub battery_capacity: u32,
}

/// Payload for creating or updating a station
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRequest {
    pub name: String,
    pub location: String,
    pub number_of_pumps: u32,
}

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Payload for reserving a charging slot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub user_id: i64,
    pub vehicle_id: i64,
    pub station_id: i64,
    pub pump_number: u32,
    pub is_reserved: bool,
    pub start_time: DateTime<Utc>,
}

/// One charging session row as returned by the history endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: i64,
    pub user: User,
    pub vehicle: Vehicle,
    pub station: Station,
    pub pump_number: u32,
    pub is_completed: bool,
    pub is_reserved: bool,
    pub is_charging: bool,
    pub start_time: DateTime<Utc>,
}

impl From<&OwnerRef> for User {
    fn from(owner: &OwnerRef) -> Self {
        Self {
            id: owner.id,
            name: owner.name.clone().unwrap_or_default(),
            email: owner.email.clone().unwrap_or_default(),
            is_admin: owner.is_admin.unwrap_or(false),
        }
    }
}

impl From<&VehicleInfo> for Vehicle {
    fn from(info: &VehicleInfo) -> Self {
        Self {
            id: info.id,
            make: info.make.clone(),
            model: info.model.clone(),
            plate_number: info.plate_number.clone(),
            battery_capacity: info.battery_capacity,
            owner: info.owner.as_ref().map(User::from),
        }
    }
}

impl From<&StationInfo> for Station {
    fn from(info: &StationInfo) -> Self {
        Self {
            id: info.id,
            name: info.name.clone(),
            location: info.location.clone(),
            number_of_pumps: info.number_of_pumps,
        }
    }
}
