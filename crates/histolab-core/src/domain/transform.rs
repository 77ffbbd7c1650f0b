//! Point-wise intensity transforms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Error, Histograms, Result};

/// Largest accepted bit-shift amount.
pub const MAX_SHIFT_BITS: u32 = 31;

/// Transform selector without its parameter.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    /// `i`
    Positive,
    /// `255 - i`
    Negative,
    /// `i << n`
    ShiftLeft,
    /// `i >> n`
    ShiftRight,
    /// `i * f`
    ScaleUp,
    /// `i / f`
    ScaleDown,
    /// `e^(i/255)`
    Exp,
    /// `ln(1 + i)`
    Ln,
    /// `i^gamma`
    Power,
    /// `ln(i + 1) / ln(base + 1)`
    Log,
    /// The image's own cumulative histogram.
    Equalize,
}

impl TransformKind {
    /// Every kind, in menu order.
    pub const ALL: [Self; 11] = [
        Self::Positive,
        Self::Negative,
        Self::ShiftLeft,
        Self::ShiftRight,
        Self::ScaleUp,
        Self::ScaleDown,
        Self::Exp,
        Self::Ln,
        Self::Power,
        Self::Log,
        Self::Equalize,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::ShiftLeft => "shift-left",
            Self::ShiftRight => "shift-right",
            Self::ScaleUp => "scale-up",
            Self::ScaleDown => "scale-down",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Power => "power",
            Self::Log => "log",
            Self::Equalize => "equalize",
        }
    }

    /// Whether the kind carries a numeric parameter.
    #[must_use]
    pub const fn takes_parameter(self) -> bool {
        matches!(
            self,
            Self::ShiftLeft
                | Self::ShiftRight
                | Self::ScaleUp
                | Self::ScaleDown
                | Self::Power
                | Self::Log
        )
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| Error::InvalidOp(s.to_string()))
    }
}

/// Parameters used when a transform is requested without one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformDefaults {
    /// Shift amount for both bit-shift directions.
    pub shift_bits: u32,
    /// Factor for scale-up and scale-down.
    pub scale_factor: f64,
    /// Exponent for the power law.
    pub gamma: f64,
    /// Base for the base-log transform.
    pub log_base: f64,
}

impl Default for TransformDefaults {
    fn default() -> Self {
        Self {
            shift_bits: 1,
            scale_factor: 2.0,
            gamma: 0.5,
            log_base: 10.0,
        }
    }
}

/// A transform with its typed parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Transform {
    /// Identity.
    Positive,
    /// Inversion.
    Negative,
    /// Multiply by `2^bits`.
    BitShiftLeft {
        /// Shift amount.
        bits: u32,
    },
    /// Integer divide by `2^bits`.
    BitShiftRight {
        /// Shift amount.
        bits: u32,
    },
    /// Multiply by a factor.
    ScaleUp {
        /// Scale factor.
        factor: f64,
    },
    /// Divide by a factor.
    ScaleDown {
        /// Scale factor, must be non-zero.
        factor: f64,
    },
    /// `e^(i/255)`.
    Exponential,
    /// `ln(1 + i)`.
    NaturalLog,
    /// `i^gamma`.
    PowerLaw {
        /// Exponent.
        gamma: f64,
    },
    /// Logarithm in the given base, `ln(i + 1) / ln(base + 1)`.
    BaseLog {
        /// Base, must be non-zero.
        base: f64,
    },
    /// Histogram equalization against the source's own CDF.
    Equalize,
}

impl Transform {
    /// Builds the typed transform for `kind`.
    ///
    /// A missing parameter is taken from `defaults`; kinds without a
    /// parameter ignore it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a shift amount that is negative,
    /// fractional or above [`MAX_SHIFT_BITS`], or a non-finite number.
    pub fn from_kind(
        kind: TransformKind,
        parameter: Option<f64>,
        defaults: &TransformDefaults,
    ) -> Result<Self> {
        if let Some(value) = parameter {
            if !value.is_finite() {
                return Err(Error::InvalidParameter {
                    transform: kind.name(),
                    reason: format!("{value} is not a finite number"),
                });
            }
        }

        let transform = match kind {
            TransformKind::Positive => Self::Positive,
            TransformKind::Negative => Self::Negative,
            TransformKind::ShiftLeft => Self::BitShiftLeft {
                bits: shift_bits(kind, parameter, defaults.shift_bits)?,
            },
            TransformKind::ShiftRight => Self::BitShiftRight {
                bits: shift_bits(kind, parameter, defaults.shift_bits)?,
            },
            TransformKind::ScaleUp => Self::ScaleUp {
                factor: parameter.unwrap_or(defaults.scale_factor),
            },
            TransformKind::ScaleDown => Self::ScaleDown {
                factor: parameter.unwrap_or(defaults.scale_factor),
            },
            TransformKind::Exp => Self::Exponential,
            TransformKind::Ln => Self::NaturalLog,
            TransformKind::Power => Self::PowerLaw {
                gamma: parameter.unwrap_or(defaults.gamma),
            },
            TransformKind::Log => Self::BaseLog {
                base: parameter.unwrap_or(defaults.log_base),
            },
            TransformKind::Equalize => Self::Equalize,
        };
        Ok(transform)
    }

    /// The parameterless selector.
    #[must_use]
    pub const fn kind(&self) -> TransformKind {
        match self {
            Self::Positive => TransformKind::Positive,
            Self::Negative => TransformKind::Negative,
            Self::BitShiftLeft { .. } => TransformKind::ShiftLeft,
            Self::BitShiftRight { .. } => TransformKind::ShiftRight,
            Self::ScaleUp { .. } => TransformKind::ScaleUp,
            Self::ScaleDown { .. } => TransformKind::ScaleDown,
            Self::Exponential => TransformKind::Exp,
            Self::NaturalLog => TransformKind::Ln,
            Self::PowerLaw { .. } => TransformKind::Power,
            Self::BaseLog { .. } => TransformKind::Log,
            Self::Equalize => TransformKind::Equalize,
        }
    }

    /// Checks parameters that make every lookup entry undefined.
    ///
    /// # Errors
    ///
    /// [`Error::DivideByZero`] for a zero scale-down factor or log base,
    /// [`Error::InvalidParameter`] for an oversized shift.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::ScaleDown { factor } if factor == 0.0 => Err(Error::DivideByZero {
                operation: "scale-down",
            }),
            Self::BaseLog { base } if base == 0.0 => Err(Error::DivideByZero { operation: "log" }),
            Self::BitShiftLeft { bits } | Self::BitShiftRight { bits } if bits > MAX_SHIFT_BITS => {
                Err(Error::InvalidParameter {
                    transform: self.kind().name(),
                    reason: format!("shift of {bits} bits exceeds {MAX_SHIFT_BITS}"),
                })
            }
            _ => Ok(()),
        }
    }

    /// Raw (un-normalized) output for input intensity `i`.
    ///
    /// `reference` supplies the cumulative mapping for [`Self::Equalize`].
    #[must_use]
    pub fn evaluate(&self, i: u8, reference: &Histograms) -> f64 {
        let x = f64::from(i);
        match *self {
            Self::Positive => x,
            Self::Negative => f64::from(u8::MAX - i),
            Self::BitShiftLeft { bits } => {
                x * 1u32.checked_shl(bits).map_or(f64::INFINITY, f64::from)
            }
            Self::BitShiftRight { bits } => {
                f64::from(u32::from(i).checked_shr(bits).unwrap_or(0))
            }
            Self::ScaleUp { factor } => x * factor,
            Self::ScaleDown { factor } => x / factor,
            Self::Exponential => (x / f64::from(u8::MAX)).exp(),
            Self::NaturalLog => x.ln_1p(),
            Self::PowerLaw { gamma } => x.powf(gamma),
            Self::BaseLog { base } => x.ln_1p() / base.ln_1p(),
            Self::Equalize => reference.transform()[usize::from(i)],
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match *self {
            Self::BitShiftLeft { bits } | Self::BitShiftRight { bits } => {
                write!(f, "{name}={bits}")
            }
            Self::ScaleUp { factor } | Self::ScaleDown { factor } => write!(f, "{name}={factor}"),
            Self::PowerLaw { gamma } => write!(f, "{name}={gamma}"),
            Self::BaseLog { base } => write!(f, "{name}={base}"),
            _ => f.write_str(name),
        }
    }
}

/// Converts a shift parameter to a bit count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shift_bits(kind: TransformKind, parameter: Option<f64>, default: u32) -> Result<u32> {
    let Some(value) = parameter else {
        return Ok(default);
    };
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(MAX_SHIFT_BITS) {
        return Err(Error::InvalidParameter {
            transform: kind.name(),
            reason: format!("shift must be a whole number in 0..={MAX_SHIFT_BITS}, got {value}"),
        });
    }
    // Safe: whole number within 0..=31
    Ok(value as u32)
}
