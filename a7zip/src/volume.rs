//! Resolver wrapper used for the duration of one open call.

use std::collections::HashSet;
use std::io;

use a7zip_core::stream::InStream;
use a7zip_core::volume::VolumeResolver;

/// Forwards each distinct volume name to the caller's resolver at most once
/// and keeps the first resolution failure for error reporting.
pub(crate) struct VolumeGuard<'a> {
    inner: &'a mut dyn VolumeResolver,
    requested: HashSet<String>,
    failure: Option<(String, io::Error)>,
}

impl<'a> VolumeGuard<'a> {
    pub fn new(inner: &'a mut dyn VolumeResolver) -> Self {
        Self {
            inner,
            requested: HashSet::new(),
            failure: None,
        }
    }

    /// Name and cause of the first failed resolution.
    pub fn into_failure(self) -> Option<(String, io::Error)> {
        self.failure
    }
}

impl VolumeResolver for VolumeGuard<'_> {
    fn resolve(&mut self, name: &str) -> io::Result<Option<Box<dyn InStream>>> {
        if !self.requested.insert(name.to_string()) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("volume {name} was already supplied"),
            ));
        }
        match self.inner.resolve(name) {
            Ok(stream) => {
                tracing::debug!(volume = name, found = stream.is_some(), "resolved volume");
                Ok(stream)
            }
            Err(err) => {
                let message = err.to_string();
                if self.failure.is_none() {
                    self.failure = Some((name.to_string(), err));
                }
                Err(io::Error::other(message))
            }
        }
    }
}
