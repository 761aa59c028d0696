//! Discrete status labels for the latest normal packet.

use serde::Serialize;

use crate::config::StatusThresholds;
use crate::types::{CanonicalPacket, PacketType};

/// Severity tag paired with each label. Display semantics (colors, icons)
/// belong to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StatusTag {
    Ok,
    Info,
    Warn,
    Critical,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusLabel {
    pub text: &'static str,
    pub tag: StatusTag,
}

impl StatusLabel {
    const fn new(text: &'static str, tag: StatusTag) -> Self {
        StatusLabel { text, tag }
    }
}

/// Everything a device card renders: the three labels plus the packet they
/// were derived from. Recomputed on every call, no identity across calls.
#[derive(Clone, Debug, Serialize)]
pub struct DeviceSnapshot {
    pub imei: String,
    pub gps: StatusLabel,
    pub speed: StatusLabel,
    pub battery: StatusLabel,
    pub packet: Option<CanonicalPacket>,
}

/// The most recent normal packet: maximum sort instant, falling back to the
/// first normal packet in caller order when no instant resolves (newest-first
/// convention).
pub fn latest_normal_packet(packets: &[CanonicalPacket]) -> Option<&CanonicalPacket> {
    packets
        .iter()
        .filter(|p| p.packet_type == PacketType::Normal)
        .filter_map(|p| p.sort_instant().map(|instant| (instant, p)))
        .max_by_key(|(instant, _)| *instant)
        .map(|(_, p)| p)
        .or_else(|| {
            packets
                .iter()
                .find(|p| p.packet_type == PacketType::Normal)
        })
}

pub fn gps_status(packet: Option<&CanonicalPacket>, thresholds: &StatusThresholds) -> StatusLabel {
    let packet = match packet {
        Some(p) => p,
        None => return StatusLabel::new("No GPS", StatusTag::Critical),
    };
    if packet.position(thresholds.coordinate_policy).is_none() {
        return StatusLabel::new("No GPS", StatusTag::Critical);
    }
    match packet.speed.filter(|s| s.is_finite()) {
        None => StatusLabel::new("Unknown", StatusTag::Unknown),
        Some(s) if s == 0.0 => StatusLabel::new("Idle", StatusTag::Info),
        Some(_) => StatusLabel::new("Moving", StatusTag::Ok),
    }
}

pub fn speed_status(packet: Option<&CanonicalPacket>, thresholds: &StatusThresholds) -> StatusLabel {
    match packet.and_then(|p| p.speed).filter(|s| s.is_finite()) {
        None => StatusLabel::new("-", StatusTag::Unknown),
        Some(s) if s == 0.0 => StatusLabel::new("Idle", StatusTag::Info),
        Some(s) if s > thresholds.overspeed_kmh => StatusLabel::new("Overspeed", StatusTag::Critical),
        Some(_) => StatusLabel::new("Normal", StatusTag::Ok),
    }
}

pub fn battery_status(
    packet: Option<&CanonicalPacket>,
    thresholds: &StatusThresholds,
) -> StatusLabel {
    match packet.and_then(|p| p.battery) {
        None => StatusLabel::new("-", StatusTag::Unknown),
        Some(b) if b >= thresholds.battery_good_pct => StatusLabel::new("Good", StatusTag::Ok),
        Some(b) if b >= thresholds.battery_medium_pct => StatusLabel::new("Medium", StatusTag::Warn),
        Some(_) => StatusLabel::new("Low", StatusTag::Critical),
    }
}

pub fn device_snapshot(
    imei: &str,
    packets: &[CanonicalPacket],
    thresholds: &StatusThresholds,
) -> DeviceSnapshot {
    let latest = latest_normal_packet(packets);
    DeviceSnapshot {
        imei: imei.to_string(),
        gps: gps_status(latest, thresholds),
        speed: speed_status(latest, thresholds),
        battery: battery_status(latest, thresholds),
        packet: latest.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoordinatePolicy;
    use chrono::{TimeZone, Utc};

    fn normal(minute: u32) -> CanonicalPacket {
        CanonicalPacket {
            imei: "861234567890123".to_string(),
            packet_type: PacketType::Normal,
            alert_code: None,
            latitude: Some(12.9),
            longitude: Some(77.6),
            speed: Some(20.0),
            temperature: None,
            battery: Some(75.0),
            signal: None,
            device_instant: Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, minute, 0).unwrap()),
            server_instant: None,
            device_timestamp_text: None,
        }
    }

    #[test]
    fn test_latest_normal_by_instant() {
        let mut alert = normal(50);
        alert.packet_type = PacketType::Alert;
        let packets = vec![normal(10), alert, normal(30), normal(20)];
        let latest = latest_normal_packet(&packets).unwrap();
        assert_eq!(
            latest.sort_instant(),
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_latest_normal_falls_back_to_list_order() {
        let mut a = normal(0);
        a.device_instant = None;
        a.battery = Some(42.0);
        let mut b = normal(0);
        b.device_instant = None;
        let packets = vec![a, b];
        assert_eq!(latest_normal_packet(&packets).unwrap().battery, Some(42.0));
    }

    #[test]
    fn test_no_normal_packet_defaults() {
        let thresholds = StatusThresholds::default();
        assert_eq!(gps_status(None, &thresholds).text, "No GPS");
        assert_eq!(speed_status(None, &thresholds).text, "-");
        assert_eq!(battery_status(None, &thresholds).text, "-");
    }

    #[test]
    fn test_gps_labels() {
        let thresholds = StatusThresholds::default();

        let mut p = normal(0);
        p.latitude = None;
        assert_eq!(gps_status(Some(&p), &thresholds).text, "No GPS");

        let mut p = normal(0);
        p.speed = None;
        assert_eq!(gps_status(Some(&p), &thresholds).text, "Unknown");

        let mut p = normal(0);
        p.speed = Some(0.0);
        assert_eq!(gps_status(Some(&p), &thresholds).text, "Idle");

        assert_eq!(gps_status(Some(&normal(0)), &thresholds).text, "Moving");
    }

    #[test]
    fn test_gps_zero_coordinate_policies() {
        let p = {
            let mut p = normal(0);
            p.latitude = Some(0.0);
            p
        };
        let lenient = StatusThresholds::default();
        assert_eq!(gps_status(Some(&p), &lenient).text, "Moving");

        let legacy = StatusThresholds {
            coordinate_policy: CoordinatePolicy::ZeroIsMissing,
            ..StatusThresholds::default()
        };
        assert_eq!(gps_status(Some(&p), &legacy).text, "No GPS");
    }

    #[test]
    fn test_speed_labels() {
        let thresholds = StatusThresholds::default();
        let mut p = normal(0);

        p.speed = Some(0.0);
        assert_eq!(speed_status(Some(&p), &thresholds).text, "Idle");
        p.speed = Some(72.5);
        assert_eq!(speed_status(Some(&p), &thresholds).text, "Overspeed");
        p.speed = Some(45.0);
        assert_eq!(speed_status(Some(&p), &thresholds).text, "Normal");
        p.speed = None;
        assert_eq!(speed_status(Some(&p), &thresholds).text, "-");
    }

    #[test]
    fn test_battery_labels() {
        let thresholds = StatusThresholds::default();
        let mut p = normal(0);

        p.battery = Some(60.0);
        assert_eq!(battery_status(Some(&p), &thresholds).text, "Good");
        p.battery = Some(20.0);
        assert_eq!(battery_status(Some(&p), &thresholds).text, "Medium");
        p.battery = Some(19.9);
        assert_eq!(battery_status(Some(&p), &thresholds).text, "Low");
        p.battery = None;
        assert_eq!(battery_status(Some(&p), &thresholds).text, "-");
    }

    #[test]
    fn test_snapshot_carries_packet() {
        let packets = vec![normal(10), normal(30)];
        let snapshot = device_snapshot("861234567890123", &packets, &StatusThresholds::default());
        assert_eq!(snapshot.gps.text, "Moving");
        assert_eq!(snapshot.speed.text, "Normal");
        assert_eq!(snapshot.battery.text, "Good");
        assert_eq!(
            snapshot.packet.and_then(|p| p.sort_instant()),
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_snapshot_without_normals() {
        let mut alert = normal(10);
        alert.packet_type = PacketType::Alert;
        let snapshot = device_snapshot("861234567890123", &[alert], &StatusThresholds::default());
        assert_eq!(snapshot.gps.text, "No GPS");
        assert_eq!(snapshot.speed.text, "-");
        assert_eq!(snapshot.battery.text, "-");
        assert!(snapshot.packet.is_none());
    }
}
