pub mod errors;

pub use errors::{BeamError, BeamErrorCategory, BeamResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Transverse plane. x-y coupling is not modelled, so each plane is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    Horizontal,
    Vertical,
}

impl Plane {
    pub const ALL: [Plane; 2] = [Plane::Horizontal, Plane::Vertical];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "Horizontal",
            Self::Vertical => "Vertical",
        }
    }
}

impl Display for Plane {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    StrictlyPositive,
    NonNegative,
    Finite,
}

impl Constraint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrictlyPositive => "strictly positive",
            Self::NonNegative => "non-negative",
            Self::Finite => "a finite number",
        }
    }

    pub fn admits(self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            Self::StrictlyPositive => value > 0.0,
            Self::NonNegative => value >= 0.0,
            Self::Finite => true,
        }
    }

    /// Fails with a validation error naming `field` when `value` is not admitted.
    pub fn check(self, value: f64, field: &str) -> BeamResult<()> {
        if self.admits(value) {
            return Ok(());
        }
        // Non-finite input is reported against the finiteness rule, whatever was asked.
        let violated = if value.is_finite() { self } else { Self::Finite };
        Err(BeamError::validation(field, violated, value))
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsistencyCheck {
    #[default]
    Enabled,
    Disabled,
}

impl ConsistencyCheck {
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}
