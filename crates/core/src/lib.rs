//! Domain models, the user/resource registry, and error definitions.
//!
//! Foundation crate -- no I/O dependencies.

pub mod codec;
pub mod error;
pub mod registry;
pub mod types;

pub use error::{LineError, ValidationError, WardenError, WardenResult};
pub use registry::{Registry, UserMatches};
pub use types::{AccessLevel, Resource, Role, User, UserRecord};
