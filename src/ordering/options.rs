use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const MIN_COPIES: u16 = 1;
pub const MAX_COPIES: u16 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("copies must be between 1 and 1000, got {0}")]
    CopiesOutOfRange(i64),
}

/// Number of copies of a print job, always within `MIN_COPIES..=MAX_COPIES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64")]
pub struct Copies(u16);

impl Copies {
    pub fn new(value: i64) -> Result<Self, OptionsError> {
        if (MIN_COPIES as i64..=MAX_COPIES as i64).contains(&value) {
            Ok(Self(value as u16))
        } else {
            Err(OptionsError::CopiesOutOfRange(value))
        }
    }

    /// Pulls out-of-range input back into bounds, like a bounded number field.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(MIN_COPIES as i64, MAX_COPIES as i64) as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for Copies {
    fn default() -> Self {
        Self(MIN_COPIES)
    }
}

impl TryFrom<i64> for Copies {
    type Error = OptionsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Copies::new(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
    A3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Bw,
    Color,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaperType {
    #[default]
    Bond,
    Glossy,
    #[serde(alias = "photo")]
    Matte,
}

/// The customer's configuration of a print job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PrintOptions {
    pub paper_size: PaperSize,
    pub color_mode: ColorMode,
    pub copies: Copies,
    pub orientation: Orientation,
    pub paper_type: PaperType,
}
