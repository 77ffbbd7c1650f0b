//! Sample image catalog port.

use tracing::warn;

use crate::domain::{Error, IntensityImage, Result};

/// A fixed, enumerable set of named sample images.
pub trait SampleCatalog: Send + Sync {
    /// Sample names, in display order.
    fn names(&self) -> Vec<String>;

    /// Encoded bytes of the sample called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the bytes cannot be produced.
    fn bytes(&self, name: &str) -> anyhow::Result<Vec<u8>>;

    /// Whether `name` is in the catalog.
    fn contains(&self, name: &str) -> bool {
        self.names().iter().any(|n| n == name)
    }

    /// Decodes the sample called `name`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownSample`] if the name is not listed, [`Error::Decode`]
    /// if its bytes do not decode.
    fn load(&self, name: &str) -> Result<IntensityImage> {
        if !self.contains(name) {
            return Err(Error::UnknownSample(name.to_string()));
        }
        let bytes = self.bytes(name).map_err(|e| {
            warn!("Sample '{name}' is listed but unreadable: {e:#}");
            Error::UnknownSample(name.to_string())
        })?;
        IntensityImage::from_bytes(&bytes)
    }
}
