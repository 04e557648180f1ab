use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::warn;

use crate::{backend::parse_backend_url, camera::CameraOptions};

pub const DEFAULT_SETTINGS_FILE: &str = "gesture.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub enable_touch_gestures: bool,
    pub enable_camera_gestures: bool,
    pub gesture_threshold: f64,
    pub cooldown_ms: u64,
    pub poll_interval_ms: u64,
    pub refresh_delay_ms: u64,
    pub feedback_ms: u64,
    pub request_timeout_ms: u64,
    pub camera_frame_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".into(),
            enable_touch_gestures: true,
            enable_camera_gestures: false,
            gesture_threshold: 0.3,
            cooldown_ms: 1000,
            poll_interval_ms: 2000,
            refresh_delay_ms: 500,
            feedback_ms: 1000,
            request_timeout_ms: 5000,
            camera_frame_interval_ms: 16,
        }
    }
}

impl Settings {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn feedback_duration(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn camera_options(&self) -> CameraOptions {
        CameraOptions {
            threshold: self.gesture_threshold,
            frame_interval: Duration::from_millis(self.camera_frame_interval_ms),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        parse_backend_url(&self.backend_url).context("invalid backend_url")?;
        if !(0.0..=1.0).contains(&self.gesture_threshold) {
            bail!(
                "gesture_threshold must be within 0.0..=1.0, got {}",
                self.gesture_threshold
            );
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Defaults, then the TOML file (if present), then environment overrides.
///
/// An explicitly requested file must exist; the default `gesture.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                read_settings_file(default_path)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    // The short GESTURE_* names win over the APP__* aliases.
    let var = |name: &str| lookup(&format!("GESTURE_{name}")).or_else(|| lookup(&format!("APP__{name}")));

    if let Some(v) = var("BACKEND_URL") {
        settings.backend_url = v;
    }
    override_parsed(&mut settings.enable_touch_gestures, "ENABLE_TOUCH_GESTURES", &var);
    override_parsed(&mut settings.enable_camera_gestures, "ENABLE_CAMERA_GESTURES", &var);
    override_parsed(&mut settings.gesture_threshold, "GESTURE_THRESHOLD", &var);
    override_parsed(&mut settings.cooldown_ms, "COOLDOWN_MS", &var);
    override_parsed(&mut settings.poll_interval_ms, "POLL_INTERVAL_MS", &var);
    override_parsed(&mut settings.refresh_delay_ms, "REFRESH_DELAY_MS", &var);
    override_parsed(&mut settings.feedback_ms, "FEEDBACK_MS", &var);
    override_parsed(&mut settings.request_timeout_ms, "REQUEST_TIMEOUT_MS", &var);
    override_parsed(&mut settings.camera_frame_interval_ms, "CAMERA_FRAME_INTERVAL_MS", &var);
}

fn override_parsed<T: std::str::FromStr>(
    slot: &mut T,
    name: &str,
    var: &impl Fn(&str) -> Option<String>,
) {
    let Some(raw) = var(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!(setting = name, value = %raw, "ignoring unparsable environment override"),
    }
}
