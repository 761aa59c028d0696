//! Battery runtime and drain estimates.
//!
//! Both operations expect the packet window newest-first (see
//! `normalize::sort_by_recency`) and degrade to sentinels on missing data
//! rather than failing: every outcome renders through `Display`, with `"-"`
//! for anything that cannot be computed.

use std::fmt;

use serde::Serialize;

use crate::numeric::round_to;
use crate::types::{CanonicalPacket, PacketType};

const FULL_BATTERY_PCT: f64 = 100.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;

/// Hours the device has been running since its last full charge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum RuntimeEstimate {
    Hours(f64),
    Unavailable,
}

impl fmt::Display for RuntimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEstimate::Hours(h) => write!(f, "{h:.1}"),
            RuntimeEstimate::Unavailable => write!(f, "-"),
        }
    }
}

/// Time taken to drain from full charge to the current level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum DrainEstimate {
    Hours(f64),
    Minutes(i64),
    /// The window holds normal packets but none at 100%.
    NoFullChargeRecord,
    Unavailable,
}

impl fmt::Display for DrainEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainEstimate::Hours(h) => write!(f, "{h:.1}h"),
            DrainEstimate::Minutes(m) => write!(f, "{m}m"),
            DrainEstimate::NoFullChargeRecord => write!(f, "No 100% record"),
            DrainEstimate::Unavailable => write!(f, "-"),
        }
    }
}

/// Elapsed hours between the most recent 100% reading and the newest packet.
///
/// Scans in the given order, so with newest-first input the first 100% hit is
/// the most recent one. Rounded to 1 decimal.
pub fn runtime_since_full(packets: &[CanonicalPacket]) -> RuntimeEstimate {
    let newest = match packets.first() {
        Some(p) => p,
        None => return RuntimeEstimate::Unavailable,
    };
    let full = match packets
        .iter()
        .find(|p| p.battery.map_or(false, |b| b == FULL_BATTERY_PCT))
    {
        Some(p) => p,
        None => return RuntimeEstimate::Unavailable,
    };
    let (start, end) = match (full.sort_instant(), newest.sort_instant()) {
        (Some(start), Some(end)) => (start, end),
        _ => return RuntimeEstimate::Unavailable,
    };

    let elapsed_ms = end.signed_duration_since(start).num_milliseconds();
    if elapsed_ms < 0 {
        return RuntimeEstimate::Unavailable;
    }
    RuntimeEstimate::Hours(round_to(elapsed_ms as f64 / MS_PER_HOUR, 1))
}

/// How long the battery took to drop from 100% to the current reading.
///
/// Only normal packets participate. The elapsed time is measured on the
/// device clock, since charge state is a device-side observation.
pub fn time_to_drain(packets: &[CanonicalPacket]) -> DrainEstimate {
    let normals: Vec<&CanonicalPacket> = packets
        .iter()
        .filter(|p| p.packet_type == PacketType::Normal)
        .collect();
    let current = match normals.first() {
        Some(p) => *p,
        None => return DrainEstimate::Unavailable,
    };
    let anchor = match normals
        .iter()
        .copied()
        .find(|p| p.battery.map_or(false, |b| b == FULL_BATTERY_PCT))
    {
        Some(p) => p,
        None => return DrainEstimate::NoFullChargeRecord,
    };
    // Nothing to report while still at full charge or with an unreadable level
    match current.battery {
        Some(b) if b != FULL_BATTERY_PCT => {}
        _ => return DrainEstimate::Unavailable,
    }
    let (start, end) = match (anchor.device_instant, current.device_instant) {
        (Some(start), Some(end)) => (start, end),
        _ => return DrainEstimate::Unavailable,
    };

    let elapsed_ms = end.signed_duration_since(start).num_milliseconds();
    if elapsed_ms < 0 {
        return DrainEstimate::Unavailable;
    }
    if elapsed_ms as f64 >= MS_PER_HOUR {
        DrainEstimate::Hours(round_to(elapsed_ms as f64 / MS_PER_HOUR, 1))
    } else {
        DrainEstimate::Minutes((elapsed_ms as f64 / MS_PER_MINUTE).round() as i64)
    }
}
