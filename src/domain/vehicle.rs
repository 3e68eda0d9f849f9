//! Vehicle type domain entity

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::support::errors::DomainError;

/// Types of vehicles that may pass a charging point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleType {
    Car,
    Motorcycle,
    Bus,
    Emergency,
    Diplomat,
    Military,
    Foreign,
}

impl VehicleType {
    pub const ALL: [VehicleType; 7] = [
        Self::Car,
        Self::Motorcycle,
        Self::Bus,
        Self::Emergency,
        Self::Diplomat,
        Self::Military,
        Self::Foreign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "CAR",
            Self::Motorcycle => "MOTORCYCLE",
            Self::Bus => "BUS",
            Self::Emergency => "EMERGENCY",
            Self::Diplomat => "DIPLOMAT",
            Self::Military => "MILITARY",
            Self::Foreign => "FOREIGN",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = DomainError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| DomainError::UnknownVehicleType(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for VehicleType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
