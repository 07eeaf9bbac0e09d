use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".chathead.toml")
}

/// When bubbles are shown.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    ShowAlways,
    HideAlways,
    #[default]
    HideOnFullscreen,
}

/// Bubble outline. The coefficient scales the trash icon so that it can
/// swallow a bubble of this shape.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Circle,
    Rectangle,
}

impl Shape {
    pub fn coefficient(self) -> f32 {
        match self {
            Shape::Circle => 1.0,
            Shape::Rectangle => 1.4142,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub bubble: BubbleSettings,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub trash: TrashSettings,
    #[serde(default)]
    pub haptics: HapticSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub display_mode: DisplayMode,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct BubbleSettings {
    #[serde(default)]
    pub shape: Shape,
    /// Pixels a resting bubble may extend past the side edges.
    #[serde(default = "default_over_margin")]
    pub over_margin: i32,
    /// Finger travel, in density-independent pixels, that turns a tap into a
    /// drag.
    #[serde(default = "default_move_threshold_dp")]
    pub move_threshold_dp: f32,
    #[serde(default = "default_pressed_scale")]
    pub pressed_scale: f32,
    #[serde(default)]
    pub velocity_snap: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct AnimationSettings {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_capture_duration_ms")]
    pub capture_duration_ms: u64,
    #[serde(default = "default_edge_duration_ms")]
    pub edge_duration_ms: u64,
    #[serde(default = "default_edge_overshoot_tension")]
    pub edge_overshoot_tension: f32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct TrashSettings {
    #[serde(default = "default_trash_icon_size")]
    pub icon_width: i32,
    #[serde(default = "default_trash_icon_size")]
    pub icon_height: i32,
    /// Gap between the bottom screen edge and the icon when fully shown.
    #[serde(default = "default_trash_bottom_margin")]
    pub bottom_margin: i32,
    /// How long a finger must rest on a bubble before the trash appears.
    #[serde(default = "default_trash_open_delay_ms")]
    pub open_delay_ms: u64,
    #[serde(default = "default_trash_animation_duration_ms")]
    pub animation_duration_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct HapticSettings {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "default_intersect_duration_ms")]
    pub intersect_duration_ms: u64,
}

impl Default for BubbleSettings {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            over_margin: default_over_margin(),
            move_threshold_dp: default_move_threshold_dp(),
            pressed_scale: default_pressed_scale(),
            velocity_snap: false,
        }
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            capture_duration_ms: default_capture_duration_ms(),
            edge_duration_ms: default_edge_duration_ms(),
            edge_overshoot_tension: default_edge_overshoot_tension(),
        }
    }
}

impl Default for TrashSettings {
    fn default() -> Self {
        Self {
            icon_width: default_trash_icon_size(),
            icon_height: default_trash_icon_size(),
            bottom_margin: default_trash_bottom_margin(),
            open_delay_ms: default_trash_open_delay_ms(),
            animation_duration_ms: default_trash_animation_duration_ms(),
        }
    }
}

impl Default for HapticSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            intersect_duration_ms: default_intersect_duration_ms(),
        }
    }
}

impl BubbleSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.over_margin < 0 {
            issues.push(format!(
                "bubble.over_margin must be non-negative, got {}",
                self.over_margin
            ));
        }
        if !(self.move_threshold_dp >= 0.0) {
            issues.push(format!(
                "bubble.move_threshold_dp must be non-negative, got {}",
                self.move_threshold_dp
            ));
        }
        if !(self.pressed_scale > 0.0) {
            issues.push(format!(
                "bubble.pressed_scale must be positive, got {}",
                self.pressed_scale
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.over_margin < 0 {
            self.over_margin = 0;
            fixes += 1;
        }
        if !(self.move_threshold_dp >= 0.0) {
            self.move_threshold_dp = default_move_threshold_dp();
            fixes += 1;
        }
        if !(self.pressed_scale > 0.0) {
            self.pressed_scale = default_pressed_scale();
            fixes += 1;
        }

        fixes
    }
}

impl AnimationSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.refresh_interval_ms == 0 {
            issues.push("animation.refresh_interval_ms must be at least 1".to_string());
        }
        if self.capture_duration_ms == 0 {
            issues.push("animation.capture_duration_ms must be at least 1".to_string());
        }
        if self.edge_duration_ms == 0 {
            issues.push("animation.edge_duration_ms must be at least 1".to_string());
        }
        if !(self.edge_overshoot_tension >= 0.0) {
            issues.push(format!(
                "animation.edge_overshoot_tension must be non-negative, got {}",
                self.edge_overshoot_tension
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.refresh_interval_ms == 0 {
            self.refresh_interval_ms = default_refresh_interval_ms();
            fixes += 1;
        }
        if self.capture_duration_ms == 0 {
            self.capture_duration_ms = default_capture_duration_ms();
            fixes += 1;
        }
        if self.edge_duration_ms == 0 {
            self.edge_duration_ms = default_edge_duration_ms();
            fixes += 1;
        }
        if !(self.edge_overshoot_tension >= 0.0) {
            self.edge_overshoot_tension = default_edge_overshoot_tension();
            fixes += 1;
        }

        fixes
    }
}

impl TrashSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.icon_width <= 0 || self.icon_height <= 0 {
            issues.push(format!(
                "trash icon size must be positive, got {}x{}",
                self.icon_width, self.icon_height
            ));
        }
        if self.bottom_margin < 0 {
            issues.push(format!(
                "trash.bottom_margin must be non-negative, got {}",
                self.bottom_margin
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.icon_width <= 0 {
            self.icon_width = default_trash_icon_size();
            fixes += 1;
        }
        if self.icon_height <= 0 {
            self.icon_height = default_trash_icon_size();
            fixes += 1;
        }
        if self.bottom_margin < 0 {
            self.bottom_margin = 0;
            fixes += 1;
        }

        fixes
    }
}

fn yes() -> bool { true }

fn default_over_margin() -> i32 { 36 }

fn default_move_threshold_dp() -> f32 { 8.0 }

fn default_pressed_scale() -> f32 { 0.9 }

fn default_refresh_interval_ms() -> u64 { 17 }

fn default_capture_duration_ms() -> u64 { 300 }

fn default_edge_duration_ms() -> u64 { 450 }

fn default_edge_overshoot_tension() -> f32 { 1.25 }

fn default_trash_icon_size() -> i32 { 144 }

fn default_trash_bottom_margin() -> i32 { 96 }

fn default_trash_open_delay_ms() -> u64 { 500 }

fn default_trash_animation_duration_ms() -> u64 { 200 }

fn default_intersect_duration_ms() -> u64 { 15 }

impl Default for Config {
    /// The configuration shipped with the crate.
    fn default() -> Self { Self::parse(include_str!("../../chathead.default.toml")).unwrap() }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.bubble.validate());
        issues.extend(self.animation.validate());
        issues.extend(self.trash.validate());

        issues
    }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        self.bubble.auto_fix_values()
            + self.animation.auto_fix_values()
            + self.trash.auto_fix_values()
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}
