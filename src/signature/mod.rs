//! Method signatures captured from ordinary Rust functions.
//!
//! Services do not expose their methods through runtime reflection. Instead
//! each method is registered from a function or closure, and the types of its
//! parameters and return value are described through the [`Describe`] and
//! [`Returns`] traits. The resulting [`Signature`] is what the contract is
//! checked against; the erased [`Method`] is what the dispatcher calls.

pub mod method;
pub mod types;

pub use method::{Handler, Method, MethodSet, Outputs, Returns, Signature};
pub use types::{Describe, Erased, Kind, Payload, TypeInfo};
