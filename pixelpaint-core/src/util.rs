//! Utility types, used throughout the crate.

/// A layer opacity, always within `[0, 1]`.
// Because of the preconditions invalidating many bitpatterns, this is not Pod.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f32", into = "f32")]
#[repr(transparent)]
pub struct Opacity(f32);
impl Opacity {
    pub const CLEAR: Self = Self(0.0);
    pub const OPAQUE: Self = Self(1.0);
    pub fn new(val: f32) -> Result<Self, OpacityError> {
        if val.is_nan() {
            Err(OpacityError::NotANumber)
        } else if !(0.0..=1.0).contains(&val) {
            Err(OpacityError::OutOfRange(val))
        } else {
            Ok(Self(val))
        }
    }
    /// Clamp any value into range. NaN becomes fully opaque.
    #[must_use]
    pub fn saturating(val: f32) -> Self {
        if val.is_nan() {
            Self::OPAQUE
        } else {
            Self(val.clamp(0.0, 1.0))
        }
    }
    #[must_use]
    pub fn get(self) -> f32 {
        self.0
    }
    /// Scale into an 8-bit alpha multiplier, rounding to nearest.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        // In range by construction.
        (self.0 * 255.0).round() as u8
    }
}
impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}
impl TryFrom<f32> for Opacity {
    type Error = OpacityError;
    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
impl From<Opacity> for f32 {
    fn from(value: Opacity) -> Self {
        value.get()
    }
}
// Never NaN, so PartialEq is total.
impl Eq for Opacity {}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum OpacityError {
    #[error("opacity is NaN")]
    NotANumber,
    #[error("opacity {0} outside of [0, 1]")]
    OutOfRange(f32),
}
