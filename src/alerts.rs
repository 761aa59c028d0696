//! Boolean alert flags over a device's full packet window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AlertThresholds;
use crate::status::latest_normal_packet;
use crate::types::CanonicalPacket;

// Known alert/error codes and their spelled-out firmware names, matched
// case-insensitively against the packet's alert field.
const SOS_CODES: [&str; 2] = ["A1002", "SOS"];
const TAMPER_CODES: [&str; 2] = ["A1003", "TAMPERED"];
const SIM_CODES: [&str; 3] = ["E1011", "NO_SIM", "NO SIM"];
const DATA_CODES: [&str; 3] = ["E1003", "NO_DATA_CAPABILITY", "NO DATA CAPABILITY"];
const GPS_CODES: [&str; 6] = [
    "E1001",
    "GNSS_ERROR",
    "GNSS CONNECTIVITY",
    "A1004",
    "GPS_DISABLED",
    "GPS DISABLE",
];

/// Condition flags for one device, evaluated once over the whole window.
/// Derived, not persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFlags {
    pub has_overspeed: bool,
    pub has_high_temp: bool,
    pub has_low_battery: bool,
    pub has_sos: bool,
    pub has_tampered: bool,
    pub has_sim_issue: bool,
    pub has_data_issue: bool,
    pub has_gps_issue: bool,
    pub is_hanged: bool,
}

/// Evaluates every flag against the thresholds.
///
/// `now` is an explicit parameter so the hang check stays pure; callers pass
/// `Utc::now()` at the call site.
pub fn evaluate_alerts(
    packets: &[CanonicalPacket],
    thresholds: &AlertThresholds,
    now: DateTime<Utc>,
) -> AlertFlags {
    AlertFlags {
        has_overspeed: packets
            .iter()
            .any(|p| p.speed.map_or(false, |s| s.is_finite() && s > thresholds.overspeed_kmh)),
        has_high_temp: packets
            .iter()
            .any(|p| p.temperature.map_or(false, |t| t > thresholds.high_temp_c)),
        has_low_battery: latest_normal_packet(packets)
            .and_then(|p| p.battery)
            .map_or(false, |b| b < thresholds.low_battery_pct),
        has_sos: any_alert_code(packets, &SOS_CODES),
        has_tampered: any_alert_code(packets, &TAMPER_CODES),
        has_sim_issue: any_alert_code(packets, &SIM_CODES),
        has_data_issue: any_alert_code(packets, &DATA_CODES),
        has_gps_issue: any_alert_code(packets, &GPS_CODES),
        is_hanged: is_hanged(packets, thresholds.hang_after_ms, now),
    }
}

fn any_alert_code(packets: &[CanonicalPacket], codes: &[&str]) -> bool {
    packets.iter().any(|p| {
        p.alert_code.as_deref().map_or(false, |code| {
            let folded = code.trim().to_ascii_uppercase();
            codes.contains(&folded.as_str())
        })
    })
}

/// A device is hanged when its newest resolvable instant is older than the
/// cutoff. A window with no resolvable instant at all counts as hanged: a
/// device that has never stamped a packet is indistinguishable from one that
/// stopped reporting.
fn is_hanged(packets: &[CanonicalPacket], hang_after_ms: i64, now: DateTime<Utc>) -> bool {
    match packets.iter().filter_map(|p| p.sort_instant()).max() {
        Some(newest) => now.signed_duration_since(newest).num_milliseconds() > hang_after_ms,
        None => true,
    }
}
