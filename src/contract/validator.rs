//! Validate a whole service and build its endpoint.

use super::checker::check;
use super::Operation;
use crate::endpoint::Endpoint;
use crate::error::{ContractError, ContractResult};
use crate::signature::{Method, MethodSet, TypeInfo};
use log::debug;
use std::sync::Arc;

/// Validate `methods` of `service` against the contract and build the endpoint.
///
/// Get, Put, New and Delete are mandatory and validated in that order; Get
/// comes first because it establishes the PayloadType. List is optional and
/// validated last, only when the service declares it. The first violation
/// aborts validation and nothing is built.
pub fn validate<S: Send + Sync + 'static>(
    service: Arc<S>,
    methods: &MethodSet<S>,
) -> ContractResult<Endpoint<S>> {
    let (get, payload) = resolve(methods, Operation::Get, None)?;
    let (put, _) = resolve(methods, Operation::Put, Some(payload))?;
    let (new, _) = resolve(methods, Operation::New, Some(payload))?;
    let (delete, _) = resolve(methods, Operation::Delete, Some(payload))?;

    let list = if methods.contains(Operation::List.method_name()) {
        Some(resolve(methods, Operation::List, Some(payload))?.0)
    } else {
        None
    };

    Ok(Endpoint::new(service, payload, get, put, new, delete, list))
}

fn resolve<S: Send + Sync + 'static>(
    methods: &MethodSet<S>,
    operation: Operation,
    payload: Option<TypeInfo>,
) -> ContractResult<(Method<S>, TypeInfo)> {
    let method = methods.get(operation.method_name());
    let payload = check(operation, method.map(Method::signature), payload)?;
    let method = method.ok_or(ContractError::MissingOperation { operation })?;
    debug!("{} method conforms: {}", operation, method.signature());
    Ok((method.clone(), payload))
}
