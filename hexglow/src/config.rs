//! Tunable engine constants and their YAML representation.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```yaml
//! hex_radius: 30
//! palette: [120, 190, 300]
//! click_mode: anywhere
//! ```

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    /// Only clicks landing on a cell that is already glowing spawn a ripple
    #[default]
    LitCells,
    /// Any click outside an interactive region spawns a ripple, cycling
    /// through the palette
    Anywhere,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Center-to-vertex distance of each hexagon in pixels
    pub hex_radius: f32,
    /// Doodle size as a fraction of `hex_radius`
    pub icon_scale: f32,
    /// Neon hues in degrees
    pub palette: Vec<f32>,
    /// Stroke widths in icon view-box units (24x24)
    pub base_stroke: f32,
    pub neon_stroke: f32,
    /// Draw a soft halo under neon strokes
    pub glow: bool,

    /// Per-frame intensity multiplier for lit cells
    pub decay: f32,
    /// Intensity below which a cell goes dark and leaves the active set
    pub floor: f32,
    /// Ripples only ignite cells dimmer than this
    pub reignite_threshold: f32,
    /// Clicks only count on cells brighter than this
    pub click_threshold: f32,
    pub click_mode: ClickMode,

    /// Initial ripple speed in pixels per frame
    pub ripple_speed: f32,
    /// Added to ripple speed every frame
    pub ripple_acceleration: f32,
    /// Ring width as a multiple of the current speed
    pub ring_factor: f32,

    /// Seconds between wander batches
    pub wander_cadence: f32,
    /// Seconds each wandering cell is held at full intensity
    pub wander_hold: f32,
    pub wander_batch: usize,
    /// Fraction of the viewport height (from the top) wander prefers
    pub wander_upper_fraction: f32,

    pub max_passes: usize,
    /// Early passes pick replacements at random, later ones deterministically
    pub random_passes: usize,
    /// Neighbor threshold as a multiple of the nearest-neighbor spacing
    pub neighbor_tolerance: f32,

    pub grid_color_light: Option<[u8; 4]>,
    pub grid_color_dark: Option<[u8; 4]>,

    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hex_radius: 25.0,
            icon_scale: 0.8,
            palette: vec![120.0, 190.0, 300.0, 280.0, 60.0],
            base_stroke: 1.5,
            neon_stroke: 2.0,
            glow: true,
            decay: 0.92,
            floor: 0.01,
            reignite_threshold: 0.1,
            click_threshold: 0.5,
            click_mode: ClickMode::LitCells,
            ripple_speed: 12.0,
            ripple_acceleration: 0.35,
            ring_factor: 1.5,
            wander_cadence: 10.0,
            wander_hold: 1.5,
            wander_batch: 14,
            wander_upper_fraction: 0.5,
            max_passes: 10,
            random_passes: 5,
            neighbor_tolerance: 1.2,
            grid_color_light: None,
            grid_color_dark: None,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config = serde_yml::from_str::<Self>(yaml)
            .map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|err| {
            ConfigError::Io(format!("{}: {}", path.display(), err))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Rejects values the engine cannot run with and clamps the rest into
    /// their working ranges.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if !(self.hex_radius.is_finite() && self.hex_radius >= 2.0) {
            return Err(ConfigError::Invalid(format!(
                "hex_radius must be at least 2, got {}",
                self.hex_radius
            )));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid(
                "palette must contain at least one hue".to_string(),
            ));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "decay must be in (0, 1), got {}",
                self.decay
            )));
        }
        if !(self.ripple_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ripple_speed must be positive, got {}",
                self.ripple_speed
            )));
        }
        if !(self.wander_cadence > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "wander_cadence must be positive, got {}",
                self.wander_cadence
            )));
        }

        self.icon_scale = self.icon_scale.clamp(0.1, 2.0);
        self.floor = self.floor.clamp(0.0, 1.0);
        self.reignite_threshold = self.reignite_threshold.clamp(0.0, 1.0);
        self.click_threshold = self.click_threshold.clamp(0.0, 1.0);
        self.ripple_acceleration = self.ripple_acceleration.max(0.0);
        self.ring_factor = self.ring_factor.max(1.0);
        self.wander_hold = self.wander_hold.clamp(0.0, self.wander_cadence);
        self.wander_upper_fraction = self.wander_upper_fraction.clamp(0.0, 1.0);
        self.random_passes = self.random_passes.min(self.max_passes);
        self.neighbor_tolerance = self.neighbor_tolerance.clamp(1.01, 1.7);

        Ok(self)
    }

    /// Converts pixel-denominated values for a display scale factor
    pub fn scaled(&self, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            hex_radius: self.hex_radius * scale,
            ripple_speed: self.ripple_speed * scale,
            ripple_acceleration: self.ripple_acceleration * scale,
            ..self.clone()
        }
    }

    pub fn grid_color(&self, theme: Theme) -> [u8; 4] {
        let custom = match theme {
            Theme::Light => self.grid_color_light,
            Theme::Dark => self.grid_color_dark,
        };
        custom.unwrap_or_else(|| theme.grid_color())
    }

    /// Doodle size in whole pixels
    pub fn icon_size(&self) -> u32 {
        (self.hex_radius * self.icon_scale).round().max(1.0) as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "Failed to read config: {}", msg),
            Self::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            Self::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl Error for ConfigError {}
