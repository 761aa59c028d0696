//! Trip segmentation over an ordered packet sequence.
//!
//! # State machine
//! Two logical states, searching and in-trip, plus an idle counter. A trip
//! opens when speed exceeds `start_speed_kmh` and closes only after
//! `required_idle_packets` consecutive packets at or below `stop_speed_kmh`.
//! The distinct start/stop thresholds plus the required run length are the
//! hysteresis that keeps a device crawling through traffic from toggling
//! between trip and idle on every packet.
//!
//! # Contract
//! Packets must be supplied in ascending chronological order; the segmenter
//! traverses them as given. Packets without a finite non-negative speed or a
//! valid coordinate are skipped entirely: they neither start, extend, nor end a
//! trip and are not counted in trip statistics.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::TripConfig;
use crate::distance::haversine_km;
use crate::numeric::round_to;
use crate::types::{CanonicalPacket, Coordinate};

/// A finalized trip. Emitted once the stop condition holds; never re-opened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub start_instant: Option<DateTime<Utc>>,
    pub end_instant: Option<DateTime<Utc>>,
    pub start_coord: Coordinate,
    pub end_coord: Coordinate,
    /// Sum of leg distances between consecutive valid packets, 3 decimals.
    pub distance_km: f64,
    /// Minutes between start and end instants, 1 decimal. `None` when either
    /// instant could not be resolved.
    pub duration_min: Option<f64>,
    /// Mean speed over the trip's packets, 1 decimal.
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub packet_count: usize,
}

/// A trip still accumulating when the input ran out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpenTrip {
    pub start_instant: Option<DateTime<Utc>>,
    pub start_coord: Coordinate,
    pub last_coord: Coordinate,
    pub distance_km: f64,
    pub max_speed_kmh: f64,
    pub packet_count: usize,
}

/// Full result of one segmentation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripScan {
    pub trips: Vec<Trip>,
    /// Trip left open at end of input, if any.
    pub open: Option<OpenTrip>,
}

/// Finalized trips only. A trip still open when the input ends is dropped;
/// use [`scan_trips`] to observe it.
pub fn segment_trips(packets: &[CanonicalPacket], config: &TripConfig) -> Vec<Trip> {
    scan_trips(packets, config).trips
}

/// Runs the segmenter and also reports the still-open trip, if any.
pub fn scan_trips(packets: &[CanonicalPacket], config: &TripConfig) -> TripScan {
    let mut trips = Vec::new();
    let mut current: Option<TripAccumulator> = None;
    let mut skipped = 0usize;

    for packet in packets {
        let (speed, coord) = match (packet.valid_speed(), packet.position(config.coordinate_policy))
        {
            (Some(speed), Some(coord)) => (speed, coord),
            _ => {
                skipped += 1;
                continue;
            }
        };

        current = match current.take() {
            None => {
                if speed > config.start_speed_kmh {
                    Some(TripAccumulator::start(packet, coord, speed))
                } else {
                    None
                }
            }
            Some(mut acc) => {
                acc.record(coord, speed);
                if speed <= config.stop_speed_kmh {
                    acc.idle_run += 1;
                } else {
                    acc.idle_run = 0;
                }
                if acc.idle_run >= config.required_idle_packets {
                    trips.push(acc.finalize(packet, coord));
                    None
                } else {
                    Some(acc)
                }
            }
        };
    }

    if skipped > 0 {
        debug!("trip scan skipped {skipped} packets without valid speed/coordinates");
    }

    TripScan {
        trips,
        open: current.map(TripAccumulator::into_open),
    }
}

struct TripAccumulator {
    start_instant: Option<DateTime<Utc>>,
    start_coord: Coordinate,
    last_coord: Coordinate,
    distance_km: f64,
    max_speed_kmh: f64,
    speed_sum: f64,
    packet_count: usize,
    idle_run: u32,
}

impl TripAccumulator {
    fn start(packet: &CanonicalPacket, coord: Coordinate, speed: f64) -> Self {
        TripAccumulator {
            start_instant: packet.sort_instant(),
            start_coord: coord,
            last_coord: coord,
            distance_km: 0.0,
            max_speed_kmh: speed,
            speed_sum: speed,
            packet_count: 1,
            idle_run: 0,
        }
    }

    /// Folds one in-trip packet into the running statistics.
    fn record(&mut self, coord: Coordinate, speed: f64) {
        self.packet_count += 1;
        self.speed_sum += speed;
        if speed > self.max_speed_kmh {
            self.max_speed_kmh = speed;
        }
        self.distance_km += haversine_km(self.last_coord, coord);
        self.last_coord = coord;
    }

    fn finalize(self, packet: &CanonicalPacket, coord: Coordinate) -> Trip {
        let end_instant = packet.sort_instant();
        let duration_min = match (self.start_instant, end_instant) {
            (Some(start), Some(end)) => Some(round_to(
                end.signed_duration_since(start).num_milliseconds() as f64 / 60_000.0,
                1,
            )),
            _ => None,
        };
        Trip {
            start_instant: self.start_instant,
            end_instant,
            start_coord: self.start_coord,
            end_coord: coord,
            distance_km: round_to(self.distance_km, 3),
            duration_min,
            avg_speed_kmh: round_to(self.speed_sum / self.packet_count as f64, 1),
            max_speed_kmh: self.max_speed_kmh,
            packet_count: self.packet_count,
        }
    }

    fn into_open(self) -> OpenTrip {
        OpenTrip {
            start_instant: self.start_instant,
            start_coord: self.start_coord,
            last_coord: self.last_coord,
            distance_km: round_to(self.distance_km, 3),
            max_speed_kmh: self.max_speed_kmh,
            packet_count: self.packet_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PacketType;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    /// One packet per minute, coordinates stepping north so legs are non-zero.
    fn packet(minute: u32, speed: f64) -> CanonicalPacket {
        CanonicalPacket {
            imei: "861234567890123".to_string(),
            packet_type: PacketType::Normal,
            alert_code: None,
            latitude: Some(12.9 + minute as f64 * 0.001),
            longitude: Some(77.6),
            speed: Some(speed),
            temperature: None,
            battery: None,
            signal: None,
            device_instant: Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, minute, 0).unwrap()),
            server_instant: None,
            device_timestamp_text: None,
        }
    }

    fn track(speeds: &[f64]) -> Vec<CanonicalPacket> {
        speeds
            .iter()
            .enumerate()
            .map(|(i, &s)| packet(i as u32, s))
            .collect()
    }

    #[test]
    fn test_basic_trip_detection() {
        let packets = track(&[3.0, 6.0, 10.0, 8.0, 1.0, 1.0, 1.0, 0.0]);
        let trips = segment_trips(&packets, &TripConfig::default());
        assert_eq!(trips.len(), 1);

        let trip = &trips[0];
        // Opens at the speed-6 packet (minute 1), closes on the third
        // consecutive idle packet (minute 6)
        assert_eq!(
            trip.start_instant,
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, 1, 0).unwrap())
        );
        assert_eq!(
            trip.end_instant,
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, 6, 0).unwrap())
        );
        assert_eq!(trip.packet_count, 6);
        assert_eq!(trip.duration_min, Some(5.0));
        assert_eq!(trip.max_speed_kmh, 10.0);
        // mean of [6, 10, 8, 1, 1, 1]
        assert_abs_diff_eq!(trip.avg_speed_kmh, 4.5, epsilon = 1e-9);
        assert!(trip.distance_km > 0.0);
    }

    #[test]
    fn test_open_trip_is_dropped() {
        let packets = track(&[3.0, 6.0, 10.0, 8.0, 1.0, 1.0]);
        let scan = scan_trips(&packets, &TripConfig::default());
        assert!(scan.trips.is_empty());

        let open = scan.open.expect("trip should still be accumulating");
        assert_eq!(open.packet_count, 5);
        assert_eq!(open.max_speed_kmh, 10.0);
        assert_eq!(
            open.start_instant,
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, 1, 0).unwrap())
        );
    }

    #[test]
    fn test_idle_run_resets_on_movement() {
        let packets = track(&[6.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0]);
        let trips = segment_trips(&packets, &TripConfig::default());
        assert_eq!(trips.len(), 1);
        // The two idle packets at minutes 1-2 must not combine with the later
        // run; the trip closes on the final packet
        assert_eq!(
            trips[0].end_instant,
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, 6, 0).unwrap())
        );
        assert_eq!(trips[0].packet_count, 7);
    }

    #[test]
    fn test_two_trips_in_one_window() {
        let packets = track(&[
            6.0, 8.0, 1.0, 1.0, 1.0, // first trip
            0.0, 0.0, // idle gap
            7.0, 9.0, 1.0, 1.0, 1.0, // second trip
        ]);
        let trips = segment_trips(&packets, &TripConfig::default());
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].packet_count, 5);
        assert_eq!(trips[1].packet_count, 5);
    }

    #[test]
    fn test_invalid_packets_skipped_entirely() {
        let mut packets = track(&[6.0, 8.0, 1.0, 1.0, 1.0]);
        // NaN speed and a missing coordinate must not extend the trip or feed
        // the idle counter
        let bad_speed = packet(9, f64::NAN);
        let mut no_fix = packet(10, 1.0);
        no_fix.latitude = None;
        packets.insert(2, bad_speed);
        packets.insert(3, no_fix);

        let trips = segment_trips(&packets, &TripConfig::default());
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].packet_count, 5);
    }

    #[test]
    fn test_no_start_below_threshold() {
        let packets = track(&[3.0, 4.0, 5.0, 2.0, 0.0]);
        let scan = scan_trips(&packets, &TripConfig::default());
        // 5 km/h does not exceed the start threshold
        assert!(scan.trips.is_empty());
        assert!(scan.open.is_none());
    }

    #[test]
    fn test_custom_thresholds() {
        let config = TripConfig {
            start_speed_kmh: 10.0,
            stop_speed_kmh: 4.0,
            required_idle_packets: 2,
            ..TripConfig::default()
        };
        let packets = track(&[8.0, 12.0, 11.0, 3.0, 3.0, 0.0]);
        let trips = segment_trips(&packets, &config);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].packet_count, 4);
    }
}
