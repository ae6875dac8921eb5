//! Resource identity

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a pooled resource
///
/// Identifiers handed out by [`ResourceId::new`] are unique for the lifetime
/// of the process, so the pool can use them as membership ground truth
/// without inspecting the resource itself.
///
/// # Examples
///
/// ```
/// use respool::ResourceId;
///
/// let a = ResourceId::new();
/// let b = ResourceId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Allocate a fresh identifier
    pub fn new() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource-{}", self.0)
    }
}

/// Capability the pool requires of a resource type
///
/// The pool is agnostic to what a resource does; it only needs a stable,
/// comparable identity that does not change for the resource's lifetime.
///
/// # Examples
///
/// ```
/// use respool::{Poolable, ResourceId};
///
/// struct Connection {
///     id: ResourceId,
/// }
///
/// impl Poolable for Connection {
///     fn id(&self) -> ResourceId {
///         self.id
///     }
/// }
/// ```
pub trait Poolable {
    /// The identifier assigned to this resource at construction
    fn id(&self) -> ResourceId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let ids: Vec<ResourceId> = (0..100).map(|_| ResourceId::new()).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn display_is_stable() {
        let id = ResourceId::new();
        assert_eq!(format!("{}", id), format!("{}", id));
    }
}
