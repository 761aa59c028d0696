//! Distance traveled within one calendar day.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::config::CoordinatePolicy;
use crate::distance::haversine_km;
use crate::numeric::round_to;
use crate::types::{CanonicalPacket, Coordinate};

/// Sums the distance covered by packets stamped on the given day, in km.
///
/// The reference day is an explicit parameter so the computation stays pure;
/// callers wanting "today" pass `Utc::now().date_naive()`. Packets are matched
/// by the day prefix of their verbatim device timestamp string, deduplicated by
/// exact timestamp, and collapsed when consecutive fixes repeat the same
/// coordinate. Returns 0 when fewer than two points survive. Rounded to 2
/// decimals.
pub fn today_distance_km(
    packets: &[CanonicalPacket],
    day: NaiveDate,
    policy: CoordinatePolicy,
) -> f64 {
    let prefix = day.format("%Y-%m-%d").to_string();
    let dated: Vec<&CanonicalPacket> = packets
        .iter()
        .filter(|p| {
            p.device_timestamp_text
                .as_deref()
                .map_or(false, |text| text.starts_with(&prefix))
        })
        .collect();
    if dated.len() < 2 {
        return 0.0;
    }

    let mut seen = HashSet::new();
    let mut polyline: Vec<Coordinate> = Vec::new();
    for packet in dated {
        let stamp = match packet.device_timestamp_text.as_deref() {
            Some(s) => s,
            None => continue,
        };
        // Repeated timestamps are retransmissions; keep the first occurrence
        if !seen.insert(stamp) {
            continue;
        }
        let coord = match packet.position(policy) {
            Some(c) => c,
            None => continue,
        };
        if polyline.last() != Some(&coord) {
            polyline.push(coord);
        }
    }
    if polyline.len() < 2 {
        return 0.0;
    }

    let total: f64 = polyline
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum();
    round_to(total, 2)
}
