//! Request-scoped propagation context.
//!
//! A [`Context`] is an immutable chain of bindings. Middleware never edits a
//! context in place; it derives a new one with [`Context::with`] and returns it,
//! and the next stage sees the extended chain. Keys are Rust types, so two
//! unrelated middleware can only collide if they bind the very same type:
//!
//! ```rust
//! use restful::Context;
//!
//! struct UserId(u64);
//! struct TenantId(u64);
//!
//! let root = Context::new();
//! let ctx = root.with(UserId(7)).with(TenantId(3));
//!
//! assert_eq!(ctx.get::<UserId>().map(|u| u.0), Some(7));
//! assert!(root.get::<UserId>().is_none());
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Immutable, append-only, type-keyed binding chain.
///
/// Cloning is one `Arc` increment; derived contexts share their parent's nodes.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Binding>>,
}

struct Binding {
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Binding>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a new context holding `value` on top of this one.
    ///
    /// A later binding of the same type shadows earlier ones for lookups; the
    /// earlier value stays reachable from contexts that were derived before.
    pub fn with<T: Any + Send + Sync>(&self, value: T) -> Self {
        let binding = Binding {
            name: type_name::<T>(),
            value: Box::new(value),
            parent: self.head.clone(),
        };
        Self { head: Some(Arc::new(binding)) }
    }

    /// Most recent binding of type `T`, walking from newest to oldest.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.bindings().find_map(|b| b.value.downcast_ref::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.get::<T>().is_some()
    }

    pub fn len(&self) -> usize {
        self.bindings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn bindings(&self) -> impl Iterator<Item = &Binding> {
        std::iter::successors(self.head.as_deref(), |b| b.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.bindings().map(|b| b.name)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Take(i64);

    #[derive(Debug, PartialEq)]
    struct Skip(i64);

    #[test]
    fn lookup_walks_newest_first() {
        let ctx = Context::new().with(Take(10)).with(Skip(2)).with(Take(30));
        assert_eq!(ctx.get::<Take>(), Some(&Take(30)));
        assert_eq!(ctx.get::<Skip>(), Some(&Skip(2)));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn deriving_never_touches_the_parent() {
        let parent = Context::new().with(Take(1));
        let left = parent.with(Skip(1));
        let right = parent.with(Skip(2));

        assert!(!parent.contains::<Skip>());
        assert_eq!(left.get::<Skip>(), Some(&Skip(1)));
        assert_eq!(right.get::<Skip>(), Some(&Skip(2)));
        assert_eq!(parent.len(), 1);
    }

    #[test]
    fn empty_context() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
        assert!(ctx.get::<Take>().is_none());
        assert_eq!(format!("{ctx:?}"), "[]");
    }
}
