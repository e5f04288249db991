//! Runtime configuration read from the environment.

use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};
use log::warn;

use crate::types::{DEFAULT_KEY_RELEASE_TIMEOUT_MS, TARGET_FPS};

/// Developer switches, given as a comma-separated list such as `fps,step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugFlags {
    /// Show the per-phase timing line.
    pub fps: bool,
    /// Allow single steps while paused.
    pub step: bool,
    /// Color objects by the side of their last collision.
    pub contact_dir: bool,
}

impl DebugFlags {
    pub fn parse(list: &str) -> Result<Self> {
        let mut flags = Self::default();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name {
                "fps" => flags.fps = true,
                "step" => flags.step = true,
                "contact_dir" => flags.contact_dir = true,
                other => bail!("unknown debug flag `{other}` (expected fps, step, contact_dir)"),
            }
        }
        Ok(flags)
    }

    pub fn any(&self) -> bool {
        self.fps || self.step || self.contact_dir
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub target_fps: u32,
    pub debug: DebugFlags,
    /// Keys without a release event count as released after this long.
    pub key_release_ms: u32,
    /// Seed for cosmetic randomness; `None` derives one from the clock.
    pub seed: Option<u32>,
    pub log_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            debug: DebugFlags::default(),
            key_release_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
            seed: None,
            log_path: None,
        }
    }
}

impl EngineConfig {
    /// Create from `TOFU_BYTE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let target_fps = var("TOFU_BYTE_TARGET_FPS")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|fps| *fps > 0)
            .unwrap_or(TARGET_FPS);

        let debug = match var("TOFU_BYTE_DEBUG") {
            Some(list) => DebugFlags::parse(&list).unwrap_or_else(|err| {
                warn!("ignoring TOFU_BYTE_DEBUG: {err}");
                DebugFlags::default()
            }),
            None => DebugFlags::default(),
        };

        let key_release_ms = var("TOFU_BYTE_KEY_RELEASE_MS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_KEY_RELEASE_TIMEOUT_MS);

        let seed = var("TOFU_BYTE_SEED").and_then(|s| s.trim().parse().ok());

        let log_path = var("TOFU_BYTE_LOG_PATH")
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            target_fps,
            debug,
            key_release_ms,
            seed,
            log_path,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.target_fps.max(1) as u64)
    }

    pub fn key_release_timeout(&self) -> Duration {
        Duration::from_millis(self.key_release_ms as u64)
    }

    /// Configured seed, or one derived from the wall clock.
    pub fn seed_or_clock(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = EngineConfig::from_vars(lookup(&[]));
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.frame_interval(), Duration::from_micros(33_333));
    }

    #[test]
    fn reads_every_variable() {
        let config = EngineConfig::from_vars(lookup(&[
            ("TOFU_BYTE_TARGET_FPS", "60"),
            ("TOFU_BYTE_DEBUG", "fps, contact_dir"),
            ("TOFU_BYTE_KEY_RELEASE_MS", "90"),
            ("TOFU_BYTE_SEED", "42"),
            ("TOFU_BYTE_LOG_PATH", " /tmp/tofu.log "),
        ]));
        assert_eq!(config.target_fps, 60);
        assert!(config.debug.fps && config.debug.contact_dir && !config.debug.step);
        assert_eq!(config.key_release_timeout(), Duration::from_millis(90));
        assert_eq!(config.seed_or_clock(), 42);
        assert_eq!(config.log_path.as_deref(), Some("/tmp/tofu.log"));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = EngineConfig::from_vars(lookup(&[
            ("TOFU_BYTE_TARGET_FPS", "0"),
            ("TOFU_BYTE_DEBUG", "fps,warp"),
            ("TOFU_BYTE_LOG_PATH", "  "),
        ]));
        assert_eq!(config.target_fps, TARGET_FPS);
        assert_eq!(config.debug, DebugFlags::default());
        assert_eq!(config.log_path, None);
    }

    #[test]
    fn debug_flags_reject_unknown_names() {
        assert!(DebugFlags::parse("step").unwrap().step);
        assert!(!DebugFlags::parse("").unwrap().any());
        assert!(DebugFlags::parse("nope").is_err());
    }
}
