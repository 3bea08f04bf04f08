//! Archive creation.

use std::fmt;
use std::sync::Arc;

use a7zip_core::create::{CreateCallback, ItemCapabilities};
use a7zip_core::engine::Engine;
use a7zip_core::error::{A7ZipError, Result};
use a7zip_core::stream::OutStream;

/// Writer for new archives of one format.
///
/// Which item properties can be set depends on the format and is reported
/// by [`capabilities`](Self::capabilities). Setting any other property on an
/// [`OutItem`](a7zip_core::OutItem) fails with
/// [`A7ZipError::UnsupportedProperty`].
pub struct OutArchive {
    engine: Arc<dyn Engine>,
    format: String,
    capabilities: ItemCapabilities,
}

impl OutArchive {
    /// Writer for `format` using the engine of the active library.
    pub fn new(format: &str) -> Result<Self> {
        let engine = crate::library::global().engine()?;
        Self::with_engine(engine, format)
    }

    /// Writer for `format` using `engine`.
    ///
    /// # Errors
    ///
    /// [`A7ZipError::Archive`] if the engine can't create `format` archives.
    pub fn with_engine(engine: Arc<dyn Engine>, format: &str) -> Result<Self> {
        let capabilities = engine.output_capabilities(format).ok_or_else(|| {
            A7ZipError::archive(format!(
                "{} can't create {format} archives",
                engine.library_name()
            ))
        })?;
        Ok(Self {
            engine,
            format: format.to_string(),
            capabilities,
        })
    }

    /// Create a `format` archive with `engine` in one call.
    pub fn create(
        engine: Arc<dyn Engine>,
        format: &str,
        out: &mut dyn OutStream,
        callback: &mut dyn CreateCallback,
    ) -> Result<()> {
        Self::with_engine(engine, format)?.write(out, callback)
    }

    /// Output format name.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Item properties the format stores.
    pub fn capabilities(&self) -> ItemCapabilities {
        self.capabilities
    }

    /// Write the items `callback` describes into `out`.
    ///
    /// `out` is truncated to the archive length; it is not closed.
    pub fn write(&self, out: &mut dyn OutStream, callback: &mut dyn CreateCallback) -> Result<()> {
        let count = callback.item_count();
        tracing::debug!(format = %self.format, items = count, "creating archive");
        self.engine.create_archive(&self.format, out, callback)
    }
}

impl fmt::Debug for OutArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutArchive")
            .field("library", &self.engine.library_name())
            .field("format", &self.format)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
