//! Ready-made resource services.
//!
//! [`InMemoryStore`] satisfies the full contract, List included, for any
//! [`Record`] type. Useful for prototypes, demos and tests.

pub mod in_memory;

pub use in_memory::InMemoryStore;

use crate::signature::Payload;

/// A payload type that carries its own id.
pub trait Record: Payload + Clone {
    fn id(&self) -> i64;

    /// Called by the store when the record is created or replaced.
    fn set_id(&mut self, id: i64);
}
