//! Type system utilities and aliases.
//!
//! - [`aliases`]: Type aliases for `Arc<Mutex<T>>` / `Arc<RwLock<T>>` shared state.

pub mod aliases;

pub use aliases::*;
