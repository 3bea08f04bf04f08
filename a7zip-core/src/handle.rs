//! Opaque engine handles.
//!
//! The engine identifies the objects it owns (open archives, loaded
//! libraries) by [`RawHandle`] tokens. A token is inert: copying it does not
//! duplicate the object. Ownership lives in [`NativeHandle`], which holds a
//! token until it is released exactly once.

use std::fmt;

use crate::error::ClosedResourceError;

/// Opaque engine token. Zero is the null handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawHandle(u64);

impl RawHandle {
    /// The null handle.
    pub const NULL: RawHandle = RawHandle(0);

    /// Wrap a raw value.
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The raw value.
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Returns true for the null handle.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle({:#x})", self.0)
    }
}

/// Single owner of a [`RawHandle`].
///
/// Not `Clone`: the token is moved in once and taken out once. After
/// [`take`](Self::take) the slot holds the null handle and every access fails
/// with [`ClosedResourceError`].
///
/// ```rust
/// use a7zip_core::handle::{NativeHandle, RawHandle};
///
/// let mut handle = NativeHandle::new(RawHandle::from_raw(7), "archive");
/// assert_eq!(handle.get().unwrap().as_raw(), 7);
///
/// let raw = handle.take();
/// assert_eq!(raw, Some(RawHandle::from_raw(7)));
/// assert!(handle.take().is_none());
/// assert!(handle.get().is_err());
/// ```
#[derive(Debug)]
pub struct NativeHandle {
    raw: RawHandle,
    resource: &'static str,
}

impl NativeHandle {
    /// Take ownership of `raw`. `resource` names the object in errors.
    pub fn new(raw: RawHandle, resource: &'static str) -> Self {
        Self { raw, resource }
    }

    /// The token, or an error if it was released.
    pub fn get(&self) -> Result<RawHandle, ClosedResourceError> {
        if self.raw.is_null() {
            Err(ClosedResourceError {
                resource: self.resource,
            })
        } else {
            Ok(self.raw)
        }
    }

    /// Zero the slot and return the token for release.
    ///
    /// Returns `None` if it was already taken.
    pub fn take(&mut self) -> Option<RawHandle> {
        let raw = std::mem::replace(&mut self.raw, RawHandle::NULL);
        (!raw.is_null()).then_some(raw)
    }

    /// Returns true once the token has been taken.
    pub fn is_released(&self) -> bool {
        self.raw.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(RawHandle::NULL.is_null());
        assert!(!RawHandle::from_raw(1).is_null());

        let handle = NativeHandle::new(RawHandle::NULL, "archive");
        assert!(handle.is_released());
        assert_eq!(handle.get().unwrap_err().to_string(), "This archive is closed.");
    }

    #[test]
    fn test_take_once() {
        let mut handle = NativeHandle::new(RawHandle::from_raw(42), "archive");
        assert!(!handle.is_released());
        assert_eq!(handle.take(), Some(RawHandle::from_raw(42)));
        assert!(handle.is_released());
        assert_eq!(handle.take(), None);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", RawHandle::from_raw(255)), "RawHandle(0xff)");
    }
}
