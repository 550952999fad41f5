//! Match one method signature against its operation's contract.

use super::{Contract, Operation, Slot};
use crate::context::Context;
use crate::error::{BoxError, ContractError, ContractResult};
use crate::query::QueryArgs;
use crate::signature::{Kind, Signature, TypeInfo};

/// Check `signature` against the contract of `operation`.
///
/// `payload` is the PayloadType established so far, if any. Returns the
/// PayloadType after the check: the one passed in, or the one this signature
/// established. `None` as the signature means the service has no such method.
///
/// Checks run in a fixed order and stop at the first violation: existence,
/// parameter count, context, each parameter, return count, each return (with
/// the pointer and serializability checks where the PayloadType is
/// established).
pub fn check(
    operation: Operation,
    signature: Option<&Signature>,
    payload: Option<TypeInfo>,
) -> ContractResult<TypeInfo> {
    let signature = signature.ok_or(ContractError::MissingOperation { operation })?;
    let contract = operation.contract();
    let mut payload = payload;

    if signature.num_in() != contract.num_in() {
        return Err(ContractError::ArgumentCount {
            operation,
            expected: contract.num_in(),
            found: signature.num_in(),
        });
    }

    let context = signature.inputs()[1];
    if !context.is::<Context>() {
        return Err(argument_type(operation, 1, "Context".to_string(), &context));
    }

    for (offset, slot) in contract.params.iter().enumerate() {
        let position = offset + 2;
        let found = signature.inputs()[position];
        match_slot(&contract, *slot, &found, &mut payload).map_err(|expected| {
            argument_type(operation, position, expected, &found)
        })??;
    }

    if signature.num_out() != contract.num_out() {
        return Err(ContractError::ReturnCount {
            operation,
            expected: contract.num_out(),
            found: signature.num_out(),
        });
    }

    for (position, slot) in contract.returns.iter().enumerate() {
        let found = signature.outputs()[position];
        match_slot(&contract, *slot, &found, &mut payload).map_err(|expected| {
            ContractError::ReturnType {
                operation,
                position,
                expected,
                found: found.name().to_string(),
            }
        })??;
    }

    payload.ok_or_else(|| ContractError::ReturnType {
        operation,
        position: 0,
        expected: "a pointer to the payload type".to_string(),
        found: "nothing".to_string(),
    })
}

/// Match `found` against `slot`.
///
/// The outer error is a plain mismatch and carries the expected type name;
/// the inner result reports pointer and serializability violations when the
/// PayloadType is being established.
fn match_slot(
    contract: &Contract,
    slot: Slot,
    found: &TypeInfo,
    payload: &mut Option<TypeInfo>,
) -> Result<ContractResult<()>, String> {
    match slot {
        Slot::Id => expect_type::<i64>(found, "i64"),
        Slot::Query => expect_type::<QueryArgs>(found, "QueryArgs"),
        Slot::Error => expect_type::<BoxError>(found, "BoxError"),
        Slot::Payload => match *payload {
            Some(known) if known == *found => Ok(Ok(())),
            Some(known) => Err(known.name().to_string()),
            None => Ok(establish(contract.operation, found).map(|info| {
                *payload = Some(info);
            })),
        },
        Slot::PayloadList => {
            let elem = found.elem().filter(|_| found.kind() == Kind::Slice);
            match (*payload, elem) {
                (Some(known), Some(elem)) if known == elem => Ok(Ok(())),
                (Some(known), _) => Err(format!("Vec<{}>", known.name())),
                (None, Some(elem)) => Ok(establish(contract.operation, &elem).map(|info| {
                    *payload = Some(info);
                })),
                (None, None) => Err("Vec of the payload type".to_string()),
            }
        }
    }
}

fn expect_type<T: 'static>(found: &TypeInfo, expected: &str) -> Result<ContractResult<()>, String> {
    if found.is::<T>() {
        Ok(Ok(()))
    } else {
        Err(expected.to_string())
    }
}

/// Accept `found` as the PayloadType: it must be a pointer whose pointee has
/// a JSON form.
fn establish(operation: Operation, found: &TypeInfo) -> ContractResult<TypeInfo> {
    if !found.is_pointer() {
        return Err(ContractError::NotPointer {
            operation,
            found: found.name().to_string(),
        });
    }

    let type_name = found
        .elem()
        .map(|elem| elem.name())
        .unwrap_or_else(|| found.name())
        .to_string();

    if !found.is_decodable() {
        return Err(ContractError::NotSerializable {
            operation,
            type_name,
            reason: "no JSON decoder".to_string(),
        });
    }

    found
        .probe()
        .map_err(|reason| ContractError::NotSerializable {
            operation,
            type_name,
            reason,
        })?;

    Ok(*found)
}

fn argument_type(
    operation: Operation,
    position: usize,
    expected: String,
    found: &TypeInfo,
) -> ContractError {
    ContractError::ArgumentType {
        operation,
        position,
        expected,
        found: found.name().to_string(),
    }
}
