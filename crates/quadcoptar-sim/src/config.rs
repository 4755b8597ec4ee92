use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use quadcoptar_core::config::GameConfig;

// Runtime/driver constants (not gameplay tuning).

pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Wall-clock length of one countdown second at time scale 1.
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Wall-clock length of one physics frame at time scale 1.
pub const FRAME_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);

/// Wall-clock gap between autopilot shots at time scale 1.
pub const FIRE_INTERVAL: Duration = Duration::from_millis(400);

/// Game config from `QUADCOPTAR_CONFIG`, or the defaults.
pub fn game_config() -> anyhow::Result<GameConfig> {
    match env::var("QUADCOPTAR_CONFIG") {
        Ok(path) => GameConfig::load(&path).with_context(|| format!("loading config from {path}")),
        Err(_) => Ok(GameConfig::default()),
    }
}

/// Where the final score is written.
pub fn score_file() -> PathBuf {
    env::var("QUADCOPTAR_SCORE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("quadcoptar-score.json"))
}

/// Slowest and fastest accepted time scales.
pub const TIME_SCALE_RANGE: (f64, f64) = (0.01, 1000.0);

/// Shortest interval handed to a tokio ticker.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Speed-up factor for all driver intervals; 1.0 is real time.
pub fn time_scale() -> f64 {
    parse_time_scale(env::var("QUADCOPTAR_TIME_SCALE").ok().as_deref())
}

/// Unset, unparsable or non-positive values mean real time; the rest is
/// clamped to [`TIME_SCALE_RANGE`].
pub fn parse_time_scale(raw: Option<&str>) -> f64 {
    let (min, max) = TIME_SCALE_RANGE;
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map_or(1.0, |v| v.clamp(min, max))
}

/// `interval` shortened by the time scale, never below [`MIN_INTERVAL`].
pub fn scaled(interval: Duration, scale: f64) -> Duration {
    interval.div_f64(scale).max(MIN_INTERVAL)
}
