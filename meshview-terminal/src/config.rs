//! Environment-driven viewer settings.

use std::path::PathBuf;
use std::time::Duration;

use meshview_core::SearchPath;

use crate::logging::LoggingConfig;

pub const ASSETS_VAR: &str = "MESHVIEW_ASSETS";
pub const FPS_VAR: &str = "MESHVIEW_FPS";
pub const LOG_FILE_VAR: &str = "MESHVIEW_LOG_FILE";

const DEFAULT_FPS: u32 = 30;
const MAX_FPS: u32 = 240;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Directory searched first for model files; its parent is searched next.
    pub asset_root: PathBuf,
    pub frame_rate: u32,
    pub logging: LoggingConfig,
    /// Settings that were present but unusable, as `KEY=value`.
    pub ignored: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            frame_rate: DEFAULT_FPS,
            logging: LoggingConfig::default(),
            ignored: Vec::new(),
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable or zero frame rates fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(ASSETS_VAR).filter(|s| !s.is_empty()) {
            config.asset_root = PathBuf::from(root);
        }
        if let Some(raw) = lookup(FPS_VAR) {
            match raw.trim().parse::<u32>() {
                Ok(fps) if fps > 0 => config.frame_rate = fps.min(MAX_FPS),
                _ => config.ignored.push(format!("{}={:?}", FPS_VAR, raw)),
            }
        }
        config.logging.log_file = lookup(LOG_FILE_VAR)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        config
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.frame_rate.max(1)))
    }

    pub fn search_path(&self) -> SearchPath {
        SearchPath::with_parent(&self.asset_root)
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.frame_interval(), Duration::from_millis(33));
        assert_eq!(config.asset_root, PathBuf::from("."));
        assert!(config.logging.log_file.is_none());
        assert!(config.ignored.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = ViewerConfig::from_lookup(lookup(&[
            (ASSETS_VAR, "/srv/models"),
            (FPS_VAR, "60"),
            (LOG_FILE_VAR, "/tmp/meshview.log"),
        ]));
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.asset_root, PathBuf::from("/srv/models"));
        assert_eq!(config.logging.log_file, Some(PathBuf::from("/tmp/meshview.log")));
        assert_eq!(
            config.search_path().dirs(),
            &[PathBuf::from("/srv/models"), PathBuf::from("/srv/models/..")]
        );
    }

    #[test]
    fn test_bad_frame_rate_falls_back() {
        assert_eq!(ViewerConfig::from_lookup(lookup(&[(FPS_VAR, "0")])).frame_rate, 30);
        let config = ViewerConfig::from_lookup(lookup(&[(FPS_VAR, "fast")]));
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.ignored, vec![format!("{FPS_VAR}=\"fast\"")]);
        assert_eq!(ViewerConfig::from_lookup(lookup(&[(FPS_VAR, "1000")])).frame_rate, 240);
    }
}
