use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CoordinatePolicy;

/// Raw record as delivered by the packet-fetch collaborator. Field names and
/// value shapes are inconsistent across firmware versions, so the record stays
/// an opaque JSON value until the normalizer has been over it.
pub type RawPacketRecord = serde_json::Value;

/// Packet classification carried in the raw `packet`/`type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketType {
    Normal,
    Alert,
    Error,
    Unknown,
}

/// A WGS84 point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate { latitude, longitude }
    }
}

/// Normalized telemetry packet for one device.
///
/// Created once per raw record by `normalize::normalize_packets` and immutable
/// afterwards. Fields the normalizer could not resolve are `None`; consumers
/// validate further (coordinates, speed) before use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPacket {
    pub imei: String,
    pub packet_type: PacketType,
    pub alert_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// km/h as reported by the device.
    pub speed: Option<f64>,
    /// °C, unit suffix already stripped.
    pub temperature: Option<f64>,
    /// Percent, `%` suffix already stripped.
    pub battery: Option<f64>,
    pub signal: Option<f64>,
    /// Clock as reported by the device itself.
    pub device_instant: Option<DateTime<Utc>>,
    /// Time the backend received the record.
    pub server_instant: Option<DateTime<Utc>>,
    /// Verbatim device timestamp string, kept for day-prefix filtering and
    /// duplicate detection in the daily aggregator.
    pub device_timestamp_text: Option<String>,
}

impl CanonicalPacket {
    /// The instant packets are ordered by: server clock when present, device
    /// clock otherwise. Packets without either still exist but sort last and
    /// are excluded from computations that need a valid instant.
    pub fn sort_instant(&self) -> Option<DateTime<Utc>> {
        self.server_instant.or(self.device_instant)
    }

    /// Speed usable for trip logic: finite and non-negative.
    pub fn valid_speed(&self) -> Option<f64> {
        self.speed.filter(|s| s.is_finite() && *s >= 0.0)
    }

    /// Position usable for distance math, judged under the given policy.
    pub fn position(&self, policy: CoordinatePolicy) -> Option<Coordinate> {
        let latitude = self.latitude.filter(|v| v.is_finite())?;
        let longitude = self.longitude.filter(|v| v.is_finite())?;
        if policy == CoordinatePolicy::ZeroIsMissing && (latitude == 0.0 || longitude == 0.0) {
            return None;
        }
        Some(Coordinate { latitude, longitude })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet_at(latitude: Option<f64>, longitude: Option<f64>) -> CanonicalPacket {
        CanonicalPacket {
            imei: "861234567890123".to_string(),
            packet_type: PacketType::Normal,
            alert_code: None,
            latitude,
            longitude,
            speed: None,
            temperature: None,
            battery: None,
            signal: None,
            device_instant: None,
            server_instant: None,
            device_timestamp_text: None,
        }
    }

    #[test]
    fn test_position_requires_both_components() {
        assert!(packet_at(Some(12.9), None)
            .position(CoordinatePolicy::ZeroIsValid)
            .is_none());
        assert!(packet_at(None, Some(77.6))
            .position(CoordinatePolicy::ZeroIsValid)
            .is_none());
        assert!(packet_at(Some(12.9), Some(77.6))
            .position(CoordinatePolicy::ZeroIsValid)
            .is_some());
    }

    #[test]
    fn test_position_rejects_non_finite() {
        assert!(packet_at(Some(f64::NAN), Some(77.6))
            .position(CoordinatePolicy::ZeroIsValid)
            .is_none());
        assert!(packet_at(Some(12.9), Some(f64::INFINITY))
            .position(CoordinatePolicy::ZeroIsValid)
            .is_none());
    }

    #[test]
    fn test_zero_coordinate_policy() {
        // An equatorial fix is a real position under the default policy
        let equator = packet_at(Some(0.0), Some(77.6));
        assert!(equator.position(CoordinatePolicy::ZeroIsValid).is_some());
        assert!(equator.position(CoordinatePolicy::ZeroIsMissing).is_none());
    }

    #[test]
    fn test_valid_speed_rejects_negative_and_nan() {
        let mut p = packet_at(None, None);
        p.speed = Some(-3.0);
        assert_eq!(p.valid_speed(), None);
        p.speed = Some(f64::NAN);
        assert_eq!(p.valid_speed(), None);
        p.speed = Some(0.0);
        assert_eq!(p.valid_speed(), Some(0.0));
    }
}
