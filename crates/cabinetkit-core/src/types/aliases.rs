//! Type aliases for shared state.
//!
//! The live scene, the panel state store and the product cache are each
//! shared between the UI, the serializer and the restorer. These aliases
//! keep that sharing uniform across crates.
//!
//! ```rust,ignore
//! use cabinetkit_core::types::*;
//!
//! let scene: ThreadSafeRw<Scene> = thread_safe_rw(Scene::new());
//! scene.write().clear_cabinets();
//! ```

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe read-write locked wrapper for read-heavy state.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// A thread-safe read-write locked hash map.
pub type ThreadSafeRwMap<K, V> = Arc<RwLock<HashMap<K, V>>>;

/// Create a new `ThreadSafe<T>`.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new `ThreadSafeRw<T>`.
#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}

/// Create an empty `ThreadSafeRwMap<K, V>`.
#[inline]
pub fn thread_safe_rw_map<K, V>() -> ThreadSafeRwMap<K, V> {
    Arc::new(RwLock::new(HashMap::new()))
}
