//! Configuration management for Libros Reader

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub zoom: ZoomConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON record collections
    pub data_dir: PathBuf,
    /// Base directory for relative document locators
    pub library_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub timeout_secs: u64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        ZoomConfig {
            min: 0.5,
            max: 3.0,
            step: 0.25,
            default: 1.0,
        }
    }
}

impl ZoomConfig {
    /// Clamp into `[min, max]` and snap to the nearest step
    pub fn clamp(&self, zoom: f32) -> f32 {
        if !zoom.is_finite() {
            return self.default;
        }
        let clamped = zoom.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from("./data");
        Config {
            storage: StorageConfig {
                library_dir: data_dir.join("library"),
                data_dir,
            },
            zoom: ZoomConfig::default(),
            render: RenderConfig { timeout_secs: 30 },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let data_dir = env::var("LIBROS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage.data_dir);
        let library_dir = env::var("LIBROS_LIBRARY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("library"));

        Config {
            storage: StorageConfig {
                data_dir,
                library_dir,
            },
            zoom: ZoomConfig {
                min: parse_var("LIBROS_ZOOM_MIN", defaults.zoom.min),
                max: parse_var("LIBROS_ZOOM_MAX", defaults.zoom.max),
                step: parse_var("LIBROS_ZOOM_STEP", defaults.zoom.step),
                default: parse_var("LIBROS_DEFAULT_ZOOM", defaults.zoom.default),
            },
            render: RenderConfig {
                timeout_secs: parse_var("LIBROS_RENDER_TIMEOUT_SECS", defaults.render.timeout_secs),
            },
        }
        .validated()
    }

    /// Replace unusable zoom bounds and render timeouts with defaults
    fn validated(mut self) -> Self {
        let defaults = Config::default();

        if self.zoom.min.is_nan() || self.zoom.min <= 0.0 {
            tracing::warn!("LIBROS_ZOOM_MIN must be positive, using default zoom bounds");
            self.zoom = defaults.zoom;
        } else if self.zoom.min > self.zoom.max {
            tracing::warn!("LIBROS_ZOOM_MIN exceeds LIBROS_ZOOM_MAX, using default zoom bounds");
            self.zoom = defaults.zoom;
        }

        if self.render.timeout_secs == 0 {
            tracing::warn!("LIBROS_RENDER_TIMEOUT_SECS must be at least 1, using default");
            self.render.timeout_secs = defaults.render.timeout_secs;
        }

        self
    }

    /// User configured for the CLI, if any
    pub fn user_from_env() -> Option<String> {
        env::var("LIBROS_USER").ok().filter(|u| !u.trim().is_empty())
    }
}

fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_clamp_bounds() {
        let zoom = ZoomConfig::default();
        assert_eq!(zoom.clamp(0.1), 0.5);
        assert_eq!(zoom.clamp(10.0), 3.0);
        assert_eq!(zoom.clamp(f32::NAN), 1.0);
    }

    #[test]
    fn test_zoom_snaps_to_step() {
        let zoom = ZoomConfig::default();
        assert_eq!(zoom.clamp(1.1), 1.0);
        assert_eq!(zoom.clamp(1.2), 1.25);
        assert_eq!(zoom.clamp(2.9), 3.0);
    }

    #[test]
    fn test_unusable_values_fall_back_to_defaults() {
        let mut config = Config::default();
        config.zoom.min = 0.0;
        config.render.timeout_secs = 0;
        let config = config.validated();
        assert_eq!(config.zoom.min, 0.5);
        assert_eq!(config.render.timeout_secs, 30);

        let mut config = Config::default();
        config.zoom.min = -1.0;
        assert_eq!(config.validated().zoom.min, 0.5);

        let mut config = Config::default();
        config.zoom.min = 4.0;
        assert_eq!(config.validated().zoom.max, 3.0);

        let mut config = Config::default();
        config.zoom.min = 0.25;
        config.render.timeout_secs = 5;
        let config = config.validated();
        assert_eq!(config.zoom.min, 0.25);
        assert_eq!(config.render.timeout_secs, 5);
    }

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(config.storage.library_dir, PathBuf::from("./data/library"));
        assert_eq!(config.render.timeout_secs, 30);
    }
}
