use std::env;
use std::str::FromStr;

use wink_detect_wasm::{DetectionConfig, LandmarkModel};

use crate::constants::{
    DEFAULT_MAX_FPS, DEFAULT_REPLAY_PATH, DEFAULT_SCROLL_STEP_PX, MAX_FPS_LIMIT,
};
use crate::dispatch::ScrollBehavior;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub detection: DetectionConfig,
    pub scroll: ScrollConfig,
    pub landmark_model: LandmarkModel,
    /// Frame pacing cap; 0 runs uncapped.
    pub max_fps: u32,
    pub replay_path: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ScrollConfig {
    pub step_px: f64,
    pub behavior: ScrollBehavior,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = DetectionConfig::default();
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            detection: DetectionConfig {
                ear_threshold: checked(
                    "EAR_THRESHOLD",
                    env_or_parse("EAR_THRESHOLD", defaults.ear_threshold),
                    defaults.ear_threshold,
                    |t| t.is_finite() && t > 0.0 && t < 1.0,
                ),
                consecutive_frames: env_or_parse(
                    "WINK_CONSECUTIVE_FRAMES",
                    defaults.consecutive_frames,
                ),
            },
            scroll: ScrollConfig {
                step_px: checked(
                    "SCROLL_STEP_PX",
                    env_or_parse("SCROLL_STEP_PX", DEFAULT_SCROLL_STEP_PX),
                    DEFAULT_SCROLL_STEP_PX,
                    |px| px.is_finite() && px > 0.0,
                ),
                behavior: if env_or_bool("SCROLL_SMOOTH", true) {
                    ScrollBehavior::Smooth
                } else {
                    ScrollBehavior::Instant
                },
            },
            landmark_model: env_or_parse("LANDMARK_MODEL", LandmarkModel::default()),
            max_fps: checked(
                "MAX_FPS",
                env_or_parse("MAX_FPS", DEFAULT_MAX_FPS),
                DEFAULT_MAX_FPS,
                |fps| fps <= MAX_FPS_LIMIT,
            ),
            replay_path: env_or("REPLAY_PATH", DEFAULT_REPLAY_PATH),
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Falls back to `default` when a parsed value is outside its valid range.
fn checked<T>(key: &str, value: T, default: T, valid: impl Fn(T) -> bool) -> T
where
    T: Copy + std::fmt::Display,
{
    if valid(value) {
        value
    } else {
        tracing::warn!(key, value = %value, "Env var out of range, using default");
        default
    }
}
