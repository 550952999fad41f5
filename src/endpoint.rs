//! The validated, immutable description of one mounted service.

use crate::contract::Operation;
use crate::signature::{Method, TypeInfo};
use std::fmt;
use std::sync::Arc;

/// A service instance together with its PayloadType and validated methods.
///
/// Only [`validate`](crate::contract::validate) builds one, and only after
/// every mandatory operation passed. Shared by the route handlers through an
/// `Arc`; never mutated.
pub struct Endpoint<S> {
    service: Arc<S>,
    payload: TypeInfo,
    get: Method<S>,
    put: Method<S>,
    new: Method<S>,
    delete: Method<S>,
    list: Option<Method<S>>,
}

impl<S: Send + Sync + 'static> Endpoint<S> {
    pub(crate) fn new(
        service: Arc<S>,
        payload: TypeInfo,
        get: Method<S>,
        put: Method<S>,
        new: Method<S>,
        delete: Method<S>,
        list: Option<Method<S>>,
    ) -> Self {
        Self {
            service,
            payload,
            get,
            put,
            new,
            delete,
            list,
        }
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// The `Box<T>` type exchanged as request and response bodies.
    pub fn payload(&self) -> TypeInfo {
        self.payload
    }

    /// The validated method for `operation`, if the service provides it.
    pub fn method(&self, operation: Operation) -> Option<&Method<S>> {
        match operation {
            Operation::Get => Some(&self.get),
            Operation::Put => Some(&self.put),
            Operation::New => Some(&self.new),
            Operation::Delete => Some(&self.delete),
            Operation::List => self.list.as_ref(),
        }
    }

    /// Operations served by this endpoint.
    pub fn operations(&self) -> Vec<Operation> {
        let mut operations = Operation::MANDATORY.to_vec();
        if self.list.is_some() {
            operations.push(Operation::List);
        }
        operations
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.method(operation).is_some()
    }
}

impl<S> fmt::Debug for Endpoint<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("service", &std::any::type_name::<S>())
            .field("payload", &self.payload)
            .field("list", &self.list.is_some())
            .finish()
    }
}
