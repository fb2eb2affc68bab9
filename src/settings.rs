use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::actions::{RegionActions, TapAction};
use crate::animation::AnimationKind;
use crate::gesture::GestureConfig;

pub const CURRENT_VERSION: u32 = 2;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "folio";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub page_animation: AnimationKind,

    #[serde(default = "default_long_press_timeout_ms")]
    pub long_press_timeout_ms: u64,

    /// 0 falls back to `system_touch_slop`
    #[serde(default)]
    pub page_touch_slop: u32,

    #[serde(default = "default_system_touch_slop")]
    pub system_touch_slop: u32,

    #[serde(default = "default_animation_duration_ms")]
    pub animation_duration_ms: u64,

    #[serde(default = "default_progress_throttle_ms")]
    pub progress_throttle_ms: u64,

    #[serde(default = "default_keep_swipe_tip")]
    pub keep_swipe_tip: String,

    #[serde(default)]
    pub region_actions: RegionActions,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_long_press_timeout_ms() -> u64 {
    600
}

fn default_system_touch_slop() -> u32 {
    8
}

fn default_animation_duration_ms() -> u64 {
    300
}

fn default_progress_throttle_ms() -> u64 {
    200
}

fn default_keep_swipe_tip() -> String {
    "Keep swiping to reach the next chapter".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            page_animation: AnimationKind::default(),
            long_press_timeout_ms: default_long_press_timeout_ms(),
            page_touch_slop: 0,
            system_touch_slop: default_system_touch_slop(),
            animation_duration_ms: default_animation_duration_ms(),
            progress_throttle_ms: default_progress_throttle_ms(),
            keep_swipe_tip: default_keep_swipe_tip(),
            region_actions: RegionActions::default(),
        }
    }
}

impl Settings {
    pub fn touch_slop(&self) -> f32 {
        match self.page_touch_slop {
            0 => self.system_touch_slop as f32,
            slop => slop as f32,
        }
    }

    pub fn long_press_timeout(&self) -> Duration {
        Duration::from_millis(self.long_press_timeout_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn progress_throttle(&self) -> Duration {
        Duration::from_millis(self.progress_throttle_ms)
    }

    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            long_press_timeout: self.long_press_timeout(),
            touch_slop: self.touch_slop(),
        }
    }
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load from `path`, or from the per-user config path when `None`.
///
/// A missing file is created with defaults. A file that fails to parse is
/// left alone and defaults are used.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = match path.map(Path::to_path_buf).or_else(preferred_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using default settings");
            return Settings::default();
        }
    };

    if !path.exists() {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Settings::default();
        if let Err(e) = save_settings_to_file(&settings, &path) {
            warn!("{e:#}");
        }
        return settings;
    }

    match load_settings_from_path(&path) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e:#}");
            Settings::default()
        }
    }
}

pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {path:?}"))?;
    let mut raw: serde_yaml::Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file {path:?}"))?;

    let version = raw
        .get("version")
        .and_then(serde_yaml::Value::as_u64)
        .unwrap_or(1) as u32;
    if version < CURRENT_VERSION {
        migrate_settings(&mut raw, version);
    }

    let settings: Settings = serde_yaml::from_value(raw)
        .with_context(|| format!("Invalid settings in {path:?}"))?;
    debug!("Loaded settings from {path:?}");

    if version < CURRENT_VERSION {
        if let Err(e) = save_settings_to_file(&settings, path) {
            warn!("{e:#}");
        }
    }
    Ok(settings)
}

fn migrate_settings(raw: &mut serde_yaml::Value, from: u32) {
    info!("Migrating settings from v{from} to v{CURRENT_VERSION}");

    if from < 2 {
        migrate_v1_to_v2(raw);
    }

    if let Some(map) = raw.as_mapping_mut() {
        map.insert("version".into(), CURRENT_VERSION.into());
    }
}

/// v1 stored the page animation as a numeric code
fn migrate_v1_to_v2(raw: &mut serde_yaml::Value) {
    let Some(map) = raw.as_mapping_mut() else {
        return;
    };
    let Some(code) = map.get("page_animation").and_then(serde_yaml::Value::as_u64) else {
        return;
    };
    let kind = match code {
        0 => "cover",
        1 => "slide",
        2 => "simulation",
        3 => "scroll",
        _ => "none",
    };
    map.insert("page_animation".into(), kind.into());
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {parent:?}"))?;
        }
    }

    let content = generate_settings_yaml(settings)?;
    fs::write(path, content).with_context(|| format!("Failed to save settings to {path:?}"))?;
    debug!("Saved settings to {path:?}");
    Ok(())
}

fn generate_settings_yaml(settings: &Settings) -> Result<String> {
    let mut content = String::new();

    content.push_str(&format!("version: {}\n", settings.version));
    let animation = serde_yaml::to_string(&settings.page_animation)?;
    content.push_str(&format!("page_animation: {}", animation));
    content.push_str(&format!(
        "long_press_timeout_ms: {}\n",
        settings.long_press_timeout_ms
    ));
    content.push_str(&format!("page_touch_slop: {}\n", settings.page_touch_slop));
    content.push_str(&format!("system_touch_slop: {}\n", settings.system_touch_slop));
    content.push_str(&format!(
        "animation_duration_ms: {}\n",
        settings.animation_duration_ms
    ));
    content.push_str(&format!(
        "progress_throttle_ms: {}\n",
        settings.progress_throttle_ms
    ));
    content.push_str(&format!(
        "keep_swipe_tip: {}",
        serde_yaml::to_string(&settings.keep_swipe_tip)?
    ));
    content.push('\n');

    content.push_str(REGION_ACTIONS_TEMPLATE);

    let actions = &settings.region_actions;
    content.push_str("region_actions:\n");
    for (name, action) in [
        ("top_left", actions.top_left),
        ("top_center", actions.top_center),
        ("top_right", actions.top_right),
        ("middle_left", actions.middle_left),
        ("center", actions.center),
        ("middle_right", actions.middle_right),
        ("bottom_left", actions.bottom_left),
        ("bottom_center", actions.bottom_center),
        ("bottom_right", actions.bottom_right),
    ] {
        content.push_str(&format!("  {name}: {}\n", TapAction::code(action)));
    }

    Ok(content)
}

const REGION_ACTIONS_TEMPLATE: &str = r#"# ============================================================================
# Tap regions
# ============================================================================
# The screen is split into a 3x3 grid. Each cell runs one action code:
#   0  show menu               7  add bookmark
#   1  next page               8  edit content
#   2  previous page           9  toggle replace rules
#   3  next chapter           10  open chapter list
#   4  previous chapter       11  open search
#   5  narration: prev para   12  sync progress
#   6  narration: next para   13  narration play/pause

"#;
