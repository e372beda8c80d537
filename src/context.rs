//! Request-scoped propagation context.
//!
//! A [`Context`] is an immutable bag of values keyed by *type*. Deriving a
//! new context with [`Context::with_value`] copies the bag and leaves the
//! original untouched, so a context handed to one piece of code can never be
//! changed under it by another.
//!
//! Keying by type means a module that stores a private newtype owns that slot
//! outright: no other code can name the type, so none can read, overwrite or
//! collide with it.

use std::sync::Arc;

use http::Extensions;

/// Immutable, copy-on-write, type-keyed context carried by every
/// [`Request`](crate::Request).
#[derive(Clone, Debug, Default)]
pub struct Context {
    values: Arc<Extensions>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a context that also carries `value`, shadowing any value of
    /// the same type this context already carries.
    pub fn with_value<T>(&self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut values = Extensions::clone(&self.values);
        values.insert(value);
        Self { values: Arc::new(values) }
    }

    /// The value of type `T`, if one was stored.
    pub fn value<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.values.get::<T>()
    }
}
