//! The CRUD method contract a service must satisfy to be mounted.
//!
//! Each [`Operation`] has a fixed [`Contract`]: the parameters that follow the
//! receiver and the context, and the values it returns. The [`checker`] matches
//! one method's [`Signature`](crate::signature::Signature) against a contract;
//! the [`validator`] runs the checker over a whole service.

pub mod checker;
pub mod validator;

pub use checker::check;
pub use validator::validate;

use std::fmt;

/// The operations of the contract, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Get,
    Put,
    New,
    Delete,
    List,
}

impl Operation {
    /// Mandatory operations, in the order they are validated.
    pub const MANDATORY: [Operation; 4] = [
        Operation::Get,
        Operation::Put,
        Operation::New,
        Operation::Delete,
    ];

    /// Name of the service method implementing this operation.
    pub fn method_name(self) -> &'static str {
        match self {
            Operation::Get => "Get",
            Operation::Put => "Put",
            Operation::New => "New",
            Operation::Delete => "Delete",
            Operation::List => "List",
        }
    }

    pub fn is_optional(self) -> bool {
        self == Operation::List
    }

    /// The expected shape of this operation's method.
    pub fn contract(self) -> Contract {
        use Slot::*;
        let (params, returns): (&'static [Slot], &'static [Slot]) = match self {
            Operation::Get => (&[Id], &[Payload, Error]),
            Operation::Put => (&[Id, Payload], &[Error]),
            Operation::New => (&[Payload], &[Id, Error]),
            Operation::Delete => (&[Id], &[Error]),
            Operation::List => (&[Query], &[PayloadList, Error]),
        };
        Contract {
            operation: self,
            params,
            returns,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// One expected parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `i64` resource id
    Id,
    /// The PayloadType; establishes it when still unknown
    Payload,
    /// `Vec` of the PayloadType
    PayloadList,
    /// [`QueryArgs`](crate::QueryArgs)
    Query,
    /// [`BoxError`](crate::BoxError), always the final return
    Error,
}

/// Expected signature of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contract {
    pub operation: Operation,
    /// Parameters after the receiver and the context
    pub params: &'static [Slot],
    pub returns: &'static [Slot],
}

impl Contract {
    /// Parameter count including the receiver and the context.
    pub fn num_in(&self) -> usize {
        self.params.len() + 2
    }

    pub fn num_out(&self) -> usize {
        self.returns.len()
    }
}
