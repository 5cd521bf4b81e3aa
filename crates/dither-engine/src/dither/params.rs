use std::fmt;

/// Rejected dither configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Fewer than two levels per channel; `1 / (n - 1)` is undefined or negative.
    PaletteTooSmall(f32),
    /// Block edge below one device pixel.
    BlockTooSmall(f32),
    /// NaN or infinite value for the named option.
    NonFinite(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaletteTooSmall(v) => write!(f, "color_num must be >= 2 (got {v})"),
            Self::BlockTooSmall(v) => write!(f, "pixel_size must be >= 1 (got {v})"),
            Self::NonFinite(name) => write!(f, "{name} must be finite"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Dither options as supplied by the host, before validation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DitherProps {
    /// Levels per color channel after quantization.
    pub color_num: f32,
    /// Block edge length in device pixels.
    pub pixel_size: f32,
}

impl Default for DitherProps {
    fn default() -> Self {
        Self {
            color_num: 4.0,
            pixel_size: 2.0,
        }
    }
}

impl DitherProps {
    pub fn validate(self) -> Result<DitherParameters, ConfigError> {
        DitherParameters::new(self.color_num, self.pixel_size)
    }

    /// Clamps into the valid range instead of rejecting.
    ///
    /// Non-finite values fall back to the defaults.
    pub fn clamped(self) -> DitherParameters {
        let defaults = Self::default();
        let color_num = if self.color_num.is_finite() { self.color_num } else { defaults.color_num };
        let pixel_size = if self.pixel_size.is_finite() { self.pixel_size } else { defaults.pixel_size };
        DitherParameters {
            palette_size: color_num.max(DitherParameters::MIN_PALETTE),
            pixel_block_size: pixel_size.max(DitherParameters::MIN_BLOCK),
        }
    }
}

impl From<DitherParameters> for DitherProps {
    fn from(p: DitherParameters) -> Self {
        Self {
            color_num: p.palette_size,
            pixel_size: p.pixel_block_size,
        }
    }
}

/// Validated parameters consumed by the dither stage.
///
/// Only constructible through validation, so the stage itself never checks.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DitherParameters {
    palette_size: f32,
    pixel_block_size: f32,
}

impl DitherParameters {
    pub const MIN_PALETTE: f32 = 2.0;
    pub const MIN_BLOCK: f32 = 1.0;

    pub fn new(palette_size: f32, pixel_block_size: f32) -> Result<Self, ConfigError> {
        if !palette_size.is_finite() {
            return Err(ConfigError::NonFinite("color_num"));
        }
        if !pixel_block_size.is_finite() {
            return Err(ConfigError::NonFinite("pixel_size"));
        }
        if palette_size < Self::MIN_PALETTE {
            return Err(ConfigError::PaletteTooSmall(palette_size));
        }
        if pixel_block_size < Self::MIN_BLOCK {
            return Err(ConfigError::BlockTooSmall(pixel_block_size));
        }
        Ok(Self {
            palette_size,
            pixel_block_size,
        })
    }

    #[inline]
    pub fn palette_size(&self) -> f32 {
        self.palette_size
    }

    #[inline]
    pub fn pixel_block_size(&self) -> f32 {
        self.pixel_block_size
    }

    /// Distance between adjacent output levels, `1 / (palette_size - 1)`.
    #[inline]
    pub fn level_step(&self) -> f32 {
        1.0 / (self.palette_size - 1.0)
    }
}

impl Default for DitherParameters {
    fn default() -> Self {
        DitherProps::default().clamped()
    }
}
