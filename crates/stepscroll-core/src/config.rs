use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
    /// Sections shown by the terminal front-end, top to bottom
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            navigation: NavigationConfig::default(),
            signal: SignalConfig::default(),
            sync: SyncConfig::default(),
            scroll: ScrollConfig::default(),
            keymap: KeymapConfig::default(),
            sections: default_sections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// What happens to a request that arrives while a transition is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPolicy {
    /// Reject the request outright
    #[default]
    Drop,
    /// Keep the most recent rejected request and run it once navigation is allowed again
    SinglePending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Minimum time after a transition completes before another may start
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Quiet period after the last raw scroll event before scrolling is considered over
    #[serde(default = "default_scroll_end_debounce_ms")]
    pub scroll_end_debounce_ms: u64,
    /// Watchdog timeout for a transition whose completion never arrives
    #[serde(default = "default_stuck_animation_timeout_ms")]
    pub stuck_animation_timeout_ms: u64,
    /// Duration handed to the scroll controller for each transition
    #[serde(default = "default_animation_duration_ms")]
    pub animation_duration_ms: u64,
    #[serde(default)]
    pub pending_policy: PendingPolicy,
    /// Number of finished animation records kept for debugging
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            scroll_end_debounce_ms: default_scroll_end_debounce_ms(),
            stuck_animation_timeout_ms: default_stuck_animation_timeout_ms(),
            animation_duration_ms: default_animation_duration_ms(),
            pending_policy: PendingPolicy::default(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl NavigationConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn scroll_end_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_end_debounce_ms)
    }

    pub fn stuck_animation_timeout(&self) -> Duration {
        Duration::from_millis(self.stuck_animation_timeout_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Wheel deltas below this are treated as jitter (pointer devices)
    #[serde(default = "default_wheel_tolerance")]
    pub wheel_tolerance: f64,
    /// Swipe distance below this is ignored; also used for wheel on touch devices
    #[serde(default = "default_touch_tolerance")]
    pub touch_tolerance: f64,
    /// Wheel delta multiplier applied on iOS to damp momentum scrolling
    #[serde(default = "default_ios_wheel_multiplier")]
    pub ios_wheel_multiplier: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            wheel_tolerance: default_wheel_tolerance(),
            touch_tolerance: default_touch_tolerance(),
            ios_wheel_multiplier: default_ios_wheel_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Verify the scroll position after every transition
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Pixel drift tolerated before a silent snap
    #[serde(default = "default_drift_tolerance")]
    pub drift_tolerance: f64,
    /// Fixed section height; the controller's viewport height is used when unset
    #[serde(default)]
    pub section_height: Option<f64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            drift_tolerance: default_drift_tolerance(),
            section_height: None,
        }
    }
}

/// Easing curve used by the scroll animator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump at the end of the animation
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    /// Exponential ease-out
    EaseOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default)]
    pub easing: EasingType,
    /// Frame rate while an animation is running
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Event poll interval while idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Terminal rows reported per mouse-wheel notch
    #[serde(default = "default_wheel_step")]
    pub wheel_step: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
            tick_rate_ms: default_tick_rate(),
            wheel_step: default_wheel_step(),
        }
    }
}

impl ScrollConfig {
    /// Time between frames while animating
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.animation_fps.max(1) as u64)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-j>" (Ctrl+j), "<S-g>" (Shift+g), "<CR>" (Enter), "<Esc>", "<Tab>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the application
    #[serde(default = "default_key_quit")]
    pub quit: String,
    /// Go to the next section
    #[serde(default = "default_key_next_section")]
    pub next_section: String,
    /// Go to the previous section
    #[serde(default = "default_key_prev_section")]
    pub prev_section: String,
    /// Jump to the first section
    #[serde(default = "default_key_first_section")]
    pub first_section: String,
    /// Jump to the last section
    #[serde(default = "default_key_last_section")]
    pub last_section: String,
    /// Toggle the debug overlay
    #[serde(default = "default_key_toggle_debug")]
    pub toggle_debug: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            next_section: default_key_next_section(),
            prev_section: default_key_prev_section(),
            first_section: default_key_first_section(),
            last_section: default_key_last_section(),
            toggle_debug: default_key_toggle_debug(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

fn default_key_quit() -> String { "q".to_string() }
fn default_key_next_section() -> String { "j".to_string() }
fn default_key_prev_section() -> String { "k".to_string() }
fn default_key_first_section() -> String { "gg".to_string() }
fn default_key_last_section() -> String { "G".to_string() }
fn default_key_toggle_debug() -> String { "d".to_string() }

fn default_sections() -> Vec<SectionConfig> {
    ["Intro", "About", "Work", "Notes", "Contact"]
        .iter()
        .map(|title| SectionConfig {
            title: title.to_string(),
            body: String::new(),
        })
        .collect()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stepscroll")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cooldown_ms() -> u64 {
    200
}

fn default_scroll_end_debounce_ms() -> u64 {
    150
}

fn default_stuck_animation_timeout_ms() -> u64 {
    3000
}

fn default_animation_duration_ms() -> u64 {
    1200
}

fn default_history_capacity() -> usize {
    16
}

fn default_wheel_tolerance() -> f64 {
    50.0
}

fn default_touch_tolerance() -> f64 {
    100.0
}

fn default_ios_wheel_multiplier() -> f64 {
    0.5
}

fn default_drift_tolerance() -> f64 {
    1.0
}

fn default_animation_fps() -> u32 {
    60
}

fn default_tick_rate() -> u64 {
    100
}

fn default_wheel_step() -> f64 {
    60.0 // one notch clears the pointer tolerance
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/stepscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("stepscroll")
            .join("config.toml")
    }

    /// Get the log file path used while the TUI owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("stepscroll.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}
