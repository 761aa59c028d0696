use serde::{Deserialize, Serialize};

use crate::config::MovementConfig;
use crate::types::CanonicalPacket;

/// Idle/moving split over a packet window, in whole percent.
///
/// The two fields are rounded independently, so they can sum to 99 or 101.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementBreakdown {
    pub idle_pct: u32,
    pub moving_pct: u32,
}

/// Classifies every packet with a finite speed as idle or moving.
/// Returns `{0, 0}` when no packet qualifies.
pub fn movement_breakdown(
    packets: &[CanonicalPacket],
    config: &MovementConfig,
) -> MovementBreakdown {
    let mut idle = 0u32;
    let mut moving = 0u32;
    for packet in packets {
        let speed = match packet.speed.filter(|s| s.is_finite()) {
            Some(s) => s,
            None => continue,
        };
        if speed <= config.idle_speed_kmh {
            idle += 1;
        } else {
            moving += 1;
        }
    }

    let total = idle + moving;
    if total == 0 {
        return MovementBreakdown::default();
    }
    MovementBreakdown {
        idle_pct: (f64::from(idle) / f64::from(total) * 100.0).round() as u32,
        moving_pct: (f64::from(moving) / f64::from(total) * 100.0).round() as u32,
    }
}
