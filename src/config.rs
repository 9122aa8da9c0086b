use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub piano: PianoConfig,
}

/// Resolution the source image is resized to before column scanning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageConfig {
    #[serde(default = "default_side")]
    pub width: u32,
    #[serde(default = "default_side")]
    pub height: u32,
    /// Upper bound on the number of columns scanned
    #[serde(default = "default_side")]
    pub width_cap: u32,
}

/// Frequency band that column intensities are mapped onto.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingConfig {
    #[serde(default = "default_fbase")]
    pub fbase: f64,
    #[serde(default = "default_fmax")]
    pub fmax: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynthesisConfig {
    /// Length of the whole rendered piece in seconds
    #[serde(default = "default_total_duration")]
    pub total_duration: f64,
    /// Highest harmonic index added on top of the fundamental (1 = fundamental only)
    #[serde(default = "default_num_harmonics")]
    pub num_harmonics: u32,
    #[serde(default = "default_harmonic_amplitude_scale")]
    pub harmonic_amplitude_scale: f64,
    /// Every mapped frequency is divided by this before synthesis
    #[serde(default = "default_pitch_divisor")]
    pub pitch_divisor: f64,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Gain fed into the tanh soft clipper
    #[serde(default = "default_clip_gain")]
    pub clip_gain: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PianoConfig {
    #[serde(default = "default_notes_dir")]
    pub notes_dir: PathBuf,
    /// Output rate used when no clip at all could be loaded
    #[serde(default = "default_sample_rate")]
    pub fallback_sample_rate: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: default_side(),
            height: default_side(),
            width_cap: default_side(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            fbase: default_fbase(),
            fmax: default_fmax(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            total_duration: default_total_duration(),
            num_harmonics: default_num_harmonics(),
            harmonic_amplitude_scale: default_harmonic_amplitude_scale(),
            pitch_divisor: default_pitch_divisor(),
            sample_rate: default_sample_rate(),
            clip_gain: default_clip_gain(),
        }
    }
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            fallback_sample_rate: default_sample_rate(),
        }
    }
}

pub fn default_side() -> u32 { 250 }
pub fn default_fbase() -> f64 { 600.0 }
pub fn default_fmax() -> f64 { 1000.0 }
pub fn default_total_duration() -> f64 { 20.0 }
pub fn default_num_harmonics() -> u32 { 3 }
pub fn default_harmonic_amplitude_scale() -> f64 { 0.5 }
pub fn default_pitch_divisor() -> f64 { 3.0 }
pub fn default_sample_rate() -> u32 { 44_100 }
pub fn default_clip_gain() -> f64 { 5.0 }
pub fn default_notes_dir() -> PathBuf { PathBuf::from("notes_online") }

impl Config {
    /// Reject values that would only fail later as degenerate output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_u32("image.width", self.image.width)?;
        positive_u32("image.height", self.image.height)?;
        positive_u32("image.width_cap", self.image.width_cap)?;
        positive_f64("mapping.fbase", self.mapping.fbase)?;
        positive_f64("mapping.fmax", self.mapping.fmax)?;
        positive_f64("synthesis.total_duration", self.synthesis.total_duration)?;
        positive_u32("synthesis.num_harmonics", self.synthesis.num_harmonics)?;
        if !self.synthesis.harmonic_amplitude_scale.is_finite() {
            return Err(ConfigError::NotFinite("synthesis.harmonic_amplitude_scale"));
        }
        positive_f64("synthesis.pitch_divisor", self.synthesis.pitch_divisor)?;
        positive_u32("synthesis.sample_rate", self.synthesis.sample_rate)?;
        positive_f64("synthesis.clip_gain", self.synthesis.clip_gain)?;
        positive_u32("piano.fallback_sample_rate", self.piano.fallback_sample_rate)?;
        Ok(())
    }
}

fn positive_u32(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive(field));
    }
    Ok(())
}

fn positive_f64(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NotPositive(field));
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::debug!("Config parse error in {}: {}", path.display(), err);
            None
        }
    }
}

/// Explicit path first, then `picsona.toml` in the working directory,
/// then the per-user config locations.
pub fn discover_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let local = PathBuf::from("picsona.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("picsona").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("picsona").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    })
}
