//! Threshold configuration for the analytics components.
//!
//! Every cutoff that was an inline constant in the legacy dashboard lives here
//! as a named field with a documented default, so components stay testable
//! against alternative threshold sets.

use serde::{Deserialize, Serialize};

/// How a coordinate pair is judged valid.
///
/// The legacy dashboard treated a literal `0` in either component as "no fix",
/// silently discarding legitimate equatorial/prime-meridian points. The default
/// here only rejects missing or non-finite components; `ZeroIsMissing` keeps the
/// legacy behavior available for comparison against historical output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatePolicy {
    #[default]
    ZeroIsValid,
    ZeroIsMissing,
}

/// Trip segmentation thresholds.
///
/// Start and stop speeds are deliberately distinct (hysteresis), and a trip only
/// ends after `required_idle_packets` consecutive low-speed packets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TripConfig {
    /// A trip opens when speed exceeds this, km/h. Default 5.
    pub start_speed_kmh: f64,
    /// Packets at or below this speed count toward the idle run, km/h. Default 2.
    pub stop_speed_kmh: f64,
    /// Consecutive idle packets required to close a trip. Default 3.
    pub required_idle_packets: u32,
    pub coordinate_policy: CoordinatePolicy,
}

impl Default for TripConfig {
    fn default() -> Self {
        TripConfig {
            start_speed_kmh: 5.0,
            stop_speed_kmh: 2.0,
            required_idle_packets: 3,
            coordinate_policy: CoordinatePolicy::default(),
        }
    }
}

/// Idle/moving split cutoff for the movement classifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementConfig {
    /// Speeds at or below this count as idle, km/h. Default 2.
    pub idle_speed_kmh: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        MovementConfig { idle_speed_kmh: 2.0 }
    }
}

/// Cutoffs for the boolean alert flags.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlertThresholds {
    /// Any packet faster than this flags overspeed, km/h. Default 70.
    pub overspeed_kmh: f64,
    /// Any packet hotter than this flags high temperature, °C. Default 50.
    pub high_temp_c: f64,
    /// Latest-normal-packet battery below this flags low battery, %. Default 20.
    pub low_battery_pct: f64,
    /// Silence longer than this marks the device hanged, ms. Default one hour.
    pub hang_after_ms: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            overspeed_kmh: 70.0,
            high_temp_c: 50.0,
            low_battery_pct: 20.0,
            hang_after_ms: 3_600_000,
        }
    }
}

/// Cutoffs for the discrete status labels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusThresholds {
    /// Speed above this labels "Overspeed", km/h. Default 70.
    pub overspeed_kmh: f64,
    /// Battery at or above this labels "Good", %. Default 60.
    pub battery_good_pct: f64,
    /// Battery at or above this labels "Medium", %. Default 20.
    pub battery_medium_pct: f64,
    pub coordinate_policy: CoordinatePolicy,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        StatusThresholds {
            overspeed_kmh: 70.0,
            battery_good_pct: 60.0,
            battery_medium_pct: 20.0,
            coordinate_policy: CoordinatePolicy::default(),
        }
    }
}
