//! Handle table mapping opaque tokens to engine objects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use a7zip_core::code::ResultCode;
use a7zip_core::engine::NativeResult;
use a7zip_core::error::NativeError;
use a7zip_core::handle::RawHandle;

/// Objects keyed by handle. Handles are never reused.
#[derive(Debug)]
pub(crate) struct HandleTable<T> {
    next: AtomicU64,
    slots: Mutex<HashMap<u64, Arc<T>>>,
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<u64, Arc<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `object` and return its new handle.
    pub fn insert(&self, object: T) -> RawHandle {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        self.slots().insert(raw, Arc::new(object));
        RawHandle::from_raw(raw)
    }

    /// Look up a live object.
    pub fn get(&self, handle: RawHandle) -> NativeResult<Arc<T>> {
        self.slots()
            .get(&handle.as_raw())
            .cloned()
            .ok_or_else(|| invalid_handle(handle))
    }

    /// Remove an object. It is dropped once the last in-flight call ends.
    pub fn remove(&self, handle: RawHandle) -> NativeResult<Arc<T>> {
        self.slots()
            .remove(&handle.as_raw())
            .ok_or_else(|| invalid_handle(handle))
    }

    /// Remove every object.
    pub fn drain(&self) -> Vec<Arc<T>> {
        self.slots().drain().map(|(_, object)| object).collect()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots().len()
    }
}

fn invalid_handle(handle: RawHandle) -> NativeError {
    NativeError::with_context(ResultCode::InvalidHandle, format!("{handle:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let table = HandleTable::new();
        let first = table.insert("first");
        let second = table.insert("second");
        assert_ne!(first, second);
        assert!(!first.is_null());
        assert_eq!(table.len(), 2);

        assert_eq!(*table.get(first).unwrap(), "first");
        table.remove(first).unwrap();
        assert_eq!(
            table.get(first).unwrap_err().code,
            ResultCode::InvalidHandle
        );
        assert!(table.remove(first).is_err());
        assert_eq!(table.len(), 1);

        assert_eq!(table.drain().len(), 1);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_null_handle_is_invalid() {
        let table: HandleTable<u8> = HandleTable::new();
        assert!(table.get(RawHandle::NULL).is_err());
    }
}
