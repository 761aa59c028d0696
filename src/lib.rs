//! Telemetry analytics core for a device-fleet monitoring backend.
//!
//! Takes the raw packet window fetched for one device and derives the facts
//! the dashboard renders: trips, distance traveled, movement/idle split,
//! battery runtime and drain estimates, threshold alert flags, and discrete
//! status labels.
//!
//! The pipeline is one-way: raw records are normalized into
//! [`types::CanonicalPacket`]s, and each consumer reads that canonical form
//! independently. Every function is synchronous, side-effect free, and
//! recomputes from the full window per call; nothing is cached or mutated in
//! place, so concurrent invocations over the same data are safe. Reference
//! times ("now", "today") are explicit parameters, never read from the wall
//! clock inside the library.

pub mod alerts;
pub mod battery;
pub mod config;
pub mod daily;
pub mod distance;
pub mod movement;
pub mod normalize;
pub mod numeric;
pub mod status;
pub mod timestamp;
pub mod trips;
pub mod types;

pub use alerts::{evaluate_alerts, AlertFlags};
pub use battery::{runtime_since_full, time_to_drain, DrainEstimate, RuntimeEstimate};
pub use config::{
    AlertThresholds, CoordinatePolicy, MovementConfig, StatusThresholds, TripConfig,
};
pub use daily::today_distance_km;
pub use distance::haversine_km;
pub use movement::{movement_breakdown, MovementBreakdown};
pub use normalize::{normalize_packets, sort_by_recency};
pub use numeric::extract_numeric;
pub use status::{
    device_snapshot, latest_normal_packet, DeviceSnapshot, StatusLabel, StatusTag,
};
pub use timestamp::{parse_instant, resolve_timestamp};
pub use trips::{scan_trips, segment_trips, OpenTrip, Trip, TripScan};
pub use types::{CanonicalPacket, Coordinate, PacketType, RawPacketRecord};
