//! Three-slot editing session.
//!
//! A session owns an Input image (the last thing opened), a Buffer holding a
//! working snapshot, and an Output holding the latest transform result.
//! Every transition computes its new image first and only then assigns it,
//! so a failed call leaves all three slots as they were.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Error, IntensityImage, Result, Transform, TransformDefaults, TransformKind};
use crate::engine;

/// One of the three images held by a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// The loaded source.
    Input,
    /// The working snapshot transforms read from.
    Buffer,
    /// The latest transform result.
    Output,
}

impl Slot {
    /// All slots, in save order.
    pub const ALL: [Self; 3] = [Self::Input, Self::Buffer, Self::Output];

    /// Lowercase slot name, used as the file suffix when saving.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Buffer => "buffer",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A trigger that moves a session from one state to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum SessionOp {
    /// Zero the output and refresh the buffer from the input.
    Reset,
    /// Restore the output from the buffer.
    Undo,
    /// Snapshot the output into the buffer.
    Copy,
    /// Drop every image.
    Clear,
    /// Run a transform.
    Apply {
        /// The transform to run.
        transform: Transform,
    },
}

impl SessionOp {
    /// Parses `reset`, `undo`, `copy`, `clear`, or a transform written as
    /// `kind` or `kind=value`, filling missing parameters from `defaults`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOp`] for an unknown name, [`Error::InvalidParameter`]
    /// for a value that is not a number or is given to a kind without one.
    pub fn parse_with(text: &str, defaults: &TransformDefaults) -> Result<Self> {
        let text = text.trim();
        match text.to_ascii_lowercase().as_str() {
            "reset" => return Ok(Self::Reset),
            "undo" => return Ok(Self::Undo),
            "copy" => return Ok(Self::Copy),
            "clear" => return Ok(Self::Clear),
            _ => {}
        }

        let (name, value) = match text.split_once('=') {
            Some((name, value)) => (name, Some(value.trim())),
            None => (text, None),
        };
        let kind: TransformKind = name.parse()?;

        let parameter = match value {
            None => None,
            Some(_) if !kind.takes_parameter() => {
                return Err(Error::InvalidParameter {
                    transform: kind.name(),
                    reason: "takes no parameter".to_string(),
                });
            }
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| Error::InvalidParameter {
                transform: kind.name(),
                reason: format!("'{raw}' is not a number"),
            })?),
        };

        Ok(Self::Apply {
            transform: Transform::from_kind(kind, parameter, defaults)?,
        })
    }

    /// Parses a comma-separated list of operations.
    ///
    /// # Errors
    ///
    /// Fails on the first entry [`Self::parse_with`] rejects.
    pub fn parse_list(text: &str, defaults: &TransformDefaults) -> Result<Vec<Self>> {
        text.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Self::parse_with(part, defaults))
            .collect()
    }
}

impl FromStr for SessionOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_with(s, &TransformDefaults::default())
    }
}

impl fmt::Display for SessionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::Undo => f.write_str("undo"),
            Self::Copy => f.write_str("copy"),
            Self::Clear => f.write_str("clear"),
            Self::Apply { transform } => write!(f, "{transform}"),
        }
    }
}

/// The Input, Buffer and Output images of one editing session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    input: IntensityImage,
    buffer: IntensityImage,
    output: IntensityImage,
}

impl Session {
    /// A session with three empty slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `image` as the new input and resets the other slots from it.
    ///
    /// # Errors
    ///
    /// Propagates engine errors from the buffer refresh.
    pub fn open(&mut self, image: IntensityImage) -> Result<()> {
        let output = IntensityImage::zeroed_like(&image);
        let buffer = engine::apply_transform(&image, &Transform::Positive)?;
        debug!("Opened {}x{} image", image.cols(), image.rows());

        self.input = image;
        self.buffer = buffer;
        self.output = output;
        Ok(())
    }

    /// Decodes the file at `path` and opens it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the file cannot be decoded; the session is
    /// left unchanged.
    pub fn open_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let image = IntensityImage::from_path(path)?;
        self.open(image)
    }

    /// Decodes `bytes` and opens the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes are not a supported image; the
    /// session is left unchanged.
    pub fn open_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let image = IntensityImage::from_bytes(bytes)?;
        self.open(image)
    }

    /// Output becomes black, Buffer becomes a copy of Input.
    ///
    /// # Errors
    ///
    /// Propagates engine errors from the buffer refresh.
    pub fn reset(&mut self) -> Result<()> {
        let output = IntensityImage::zeroed_like(&self.input);
        let buffer = engine::apply_transform(&self.input, &Transform::Positive)?;
        self.output = output;
        self.buffer = buffer;
        debug!("Session reset");
        Ok(())
    }

    /// Buffer becomes a copy of Output.
    ///
    /// # Errors
    ///
    /// Propagates engine errors.
    pub fn copy_to_buffer(&mut self) -> Result<()> {
        self.buffer = engine::apply_transform(&self.output, &Transform::Positive)?;
        debug!("Output copied to buffer");
        Ok(())
    }

    /// Output becomes a copy of Buffer.
    ///
    /// # Errors
    ///
    /// Propagates engine errors.
    pub fn undo(&mut self) -> Result<()> {
        self.output = engine::apply_transform(&self.buffer, &Transform::Positive)?;
        debug!("Output restored from buffer");
        Ok(())
    }

    /// Runs `transform` from Buffer into Output.
    ///
    /// [`Transform::Equalize`] instead re-equalizes the current Output against
    /// its own histogram.
    ///
    /// # Errors
    ///
    /// Propagates engine errors; Output is unchanged on failure.
    pub fn apply(&mut self, transform: &Transform) -> Result<()> {
        let source = if matches!(transform, Transform::Equalize) {
            &self.output
        } else {
            &self.buffer
        };
        self.output = engine::apply_transform(source, transform)?;
        Ok(())
    }

    /// Empties all three slots.
    pub fn clear(&mut self) {
        *self = Self::default();
        debug!("Session cleared");
    }

    /// Dispatches one operation.
    ///
    /// # Errors
    ///
    /// Propagates the error of the dispatched transition.
    pub fn run(&mut self, op: &SessionOp) -> Result<()> {
        match op {
            SessionOp::Reset => self.reset(),
            SessionOp::Undo => self.undo(),
            SessionOp::Copy => self.copy_to_buffer(),
            SessionOp::Clear => {
                self.clear();
                Ok(())
            }
            SessionOp::Apply { transform } => self.apply(transform),
        }
    }

    /// Whether an image has been opened.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.input.is_empty()
    }

    /// The loaded source.
    #[must_use]
    pub fn input(&self) -> &IntensityImage {
        &self.input
    }

    /// The working snapshot.
    #[must_use]
    pub fn buffer(&self) -> &IntensityImage {
        &self.buffer
    }

    /// The latest result.
    #[must_use]
    pub fn output(&self) -> &IntensityImage {
        &self.output
    }

    /// The image held in `slot`.
    #[must_use]
    pub fn slot(&self, slot: Slot) -> &IntensityImage {
        match slot {
            Slot::Input => &self.input,
            Slot::Buffer => &self.buffer,
            Slot::Output => &self.output,
        }
    }

    /// Every slot with its image, in save order.
    #[must_use]
    pub fn slots(&self) -> [(Slot, &IntensityImage); 3] {
        Slot::ALL.map(|slot| (slot, self.slot(slot)))
    }
}
