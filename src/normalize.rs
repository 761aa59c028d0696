//! Turns raw, inconsistently-shaped packet records into `CanonicalPacket`s.
//!
//! Field names drifted across firmware and backend versions, so every logical
//! field is resolved through a prioritized candidate chain. Output preserves the
//! input's length and order; downstream consumers rely on index correspondence
//! with the source array unless they sort explicitly.

use std::cmp::Reverse;

use log::debug;
use serde_json::Value;

use crate::numeric::extract_numeric;
use crate::timestamp::resolve_timestamp;
use crate::types::{CanonicalPacket, PacketType, RawPacketRecord};

/// Candidate fields for the packet classification code.
pub const PACKET_TYPE_FIELDS: [&str; 3] = ["packet", "type", "packetType"];
/// Candidate fields for the device-side clock, most specific first.
pub const DEVICE_TIMESTAMP_FIELDS: [&str; 3] =
    ["deviceTimestamp", "deviceRawTimestamp", "device_timestamp"];
/// Candidate fields for the backend receive time.
pub const SERVER_TIMESTAMP_FIELDS: [&str; 3] = ["serverTimestamp", "timestamp", "createdAt"];

const ALERT_CODE_FIELDS: [&str; 2] = ["alert", "alertCode"];
const TEMPERATURE_FIELDS: [&str; 2] = ["rawTemperature", "temperature"];

/// Normalizes the raw records for one device (IMEI fixed by the caller).
pub fn normalize_packets(imei: &str, records: &[RawPacketRecord]) -> Vec<CanonicalPacket> {
    records
        .iter()
        .map(|record| normalize_packet(imei, record))
        .collect()
}

fn normalize_packet(imei: &str, record: &RawPacketRecord) -> CanonicalPacket {
    let device_instant = resolve_timestamp(record, &DEVICE_TIMESTAMP_FIELDS);
    let server_instant = resolve_timestamp(record, &SERVER_TIMESTAMP_FIELDS);
    if device_instant.is_none() && server_instant.is_none() {
        debug!("packet for {imei} has no resolvable timestamp");
    }

    CanonicalPacket {
        imei: imei.to_string(),
        packet_type: classify_packet_type(record),
        alert_code: first_string(record, &ALERT_CODE_FIELDS),
        latitude: field_f64(record, "latitude"),
        longitude: field_f64(record, "longitude"),
        speed: field_f64(record, "speed"),
        temperature: first_numeric(record, &TEMPERATURE_FIELDS),
        battery: record.get("battery").and_then(extract_numeric),
        signal: field_f64(record, "signal"),
        device_instant,
        server_instant,
        device_timestamp_text: first_string(record, &DEVICE_TIMESTAMP_FIELDS),
    }
}

fn classify_packet_type(record: &Value) -> PacketType {
    let code = match first_value(record, &PACKET_TYPE_FIELDS).and_then(Value::as_str) {
        Some(s) => s.trim().to_ascii_uppercase(),
        None => return PacketType::Unknown,
    };
    match code.as_str() {
        "N" | "NORMAL" => PacketType::Normal,
        "A" | "ALERT" => PacketType::Alert,
        "E" | "ERROR" => PacketType::Error,
        _ => PacketType::Unknown,
    }
}

/// First candidate field that is present and not JSON null.
fn first_value<'a>(record: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .find_map(|field| record.get(field).filter(|v| !v.is_null()))
}

/// First candidate field carried as a string, verbatim.
fn first_string(record: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| record.get(field).and_then(Value::as_str))
        .map(str::to_string)
}

fn first_numeric(record: &Value, fields: &[&str]) -> Option<f64> {
    first_value(record, fields).and_then(extract_numeric)
}

fn field_f64(record: &Value, field: &str) -> Option<f64> {
    record.get(field).and_then(Value::as_f64)
}

/// Stable newest-first sort by sort instant; packets without one go last.
///
/// The battery estimator and status classifier document a newest-first input
/// convention; this establishes it regardless of fetch order.
pub fn sort_by_recency(packets: &mut [CanonicalPacket]) {
    packets.sort_by_key(|p| Reverse(p.sort_instant()));
}
