//! Options for opening an archive.

use std::fmt;

use a7zip_core::charset::Charset;
use a7zip_core::volume::VolumeResolver;

/// How to open an archive.
///
/// # Example
///
/// ```rust
/// use a7zip::OpenOptions;
/// use a7zip::charset::GB18030;
///
/// let options = OpenOptions::new()
///     .charset(GB18030)
///     .password("123456");
/// assert_eq!(options.default_charset(), Some(GB18030));
/// ```
#[derive(Default)]
pub struct OpenOptions<'a> {
    pub(crate) charset: Option<Charset>,
    pub(crate) password: Option<String>,
    pub(crate) volume_name: Option<String>,
    pub(crate) volumes: Option<&'a mut dyn VolumeResolver>,
}

impl<'a> OpenOptions<'a> {
    /// Options for a plain single-file archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Charset used to decode disguised strings when none is given per call.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Password for encrypted headers and, by default, encrypted entries.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Name of the input stream, e.g. `"multi-volume.zip.001"`.
    ///
    /// Lets the engine recognise the first volume of a set and derive the
    /// names of the others.
    pub fn volume_name(mut self, name: impl Into<String>) -> Self {
        self.volume_name = Some(name.into());
        self
    }

    /// Supplier of further volumes, consulted only while opening.
    pub fn volumes(mut self, resolver: &'a mut dyn VolumeResolver) -> Self {
        self.volumes = Some(resolver);
        self
    }

    /// The configured default charset.
    pub fn default_charset(&self) -> Option<Charset> {
        self.charset
    }
}

impl fmt::Debug for OpenOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOptions")
            .field("charset", &self.charset.map(|charset| charset.name()))
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("volume_name", &self.volume_name)
            .field("volumes", &self.volumes.is_some())
            .finish()
    }
}
