//! # respool
//!
//! Bounded, thread-safe resource pool: a shared registry of reusable handles
//! that concurrent workers borrow and return. The pool serializes membership
//! and circulation behind one coarse monitor, so expensive-to-create
//! resources (database connections, file handles, worker slots) circulate
//! safely under concurrent demand.
//!
//! ## Features
//!
//! - Identity-based membership: resources only need a stable unique id
//! - Blocking, timed, non-blocking, and async acquire
//! - Graceful shutdown that drains in-flight borrows, or immediate shutdown
//! - Retirement of a specific resource, waiting for it to come home
//! - RAII guard that returns a borrow automatically on drop
//!
//! ## Quick Start
//!
//! ```rust
//! use respool::{Pool, PoolConfig, Poolable, ResourceId};
//!
//! struct Connection {
//!     id: ResourceId,
//! }
//!
//! impl Poolable for Connection {
//!     fn id(&self) -> ResourceId {
//!         self.id
//!     }
//! }
//!
//! let pool = Pool::new(PoolConfig::default());
//! pool.open();
//! assert!(pool.add(Connection { id: ResourceId::new() }).is_ok());
//!
//! let conn = pool.acquire().unwrap();
//! // ... use the connection ...
//! assert!(pool.release(conn).is_ok());
//! ```

mod config;
mod errors;
mod pool;
mod resource;

pub use config::PoolConfig;
pub use errors::{PoolError, PoolResult};
pub use pool::{Pool, PooledResource};
pub use resource::{Poolable, ResourceId};
