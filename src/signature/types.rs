//! Runtime descriptions of the Rust types a service method accepts or returns.
//!
//! [`TypeInfo`] is a small, copyable record: the type's name, its `TypeId`,
//! a coarse [`Kind`], the element type for pointers and slices, and the JSON
//! codec functions the dispatcher needs for payloads. Types opt in through
//! [`Describe`]; resource data types opt in through [`Payload`].

use crate::context::Context;
use crate::error::{BoxError, EncodeError};
use crate::json;
use crate::query::QueryArgs;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId, type_name};
use std::fmt;

/// A value whose concrete type is only known through its [`TypeInfo`].
pub type Erased = Box<dyn Any + Send>;

type EncodeFn = fn(&(dyn Any + Send)) -> serde_json::Result<serde_json::Value>;
type DecodeFn = fn(&[u8]) -> serde_json::Result<Erased>;
type ProbeFn = fn() -> serde_json::Result<()>;

/// Coarse classification of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Unit,
    Bool,
    Int,
    Uint,
    Float,
    String,
    /// `Box<T>` or the `Arc<S>` receiver
    Pointer,
    Slice,
    Map,
    Struct,
    /// Trait objects, e.g. [`BoxError`]
    Interface,
}

/// Description of one Rust type.
///
/// Equality is type identity.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    name: &'static str,
    id: TypeId,
    kind: Kind,
    elem: Option<fn() -> TypeInfo>,
    encode: Option<EncodeFn>,
    decode: Option<DecodeFn>,
    probe: Option<ProbeFn>,
}

impl TypeInfo {
    /// Describe `T` with the given kind and no codec.
    pub fn of<T: ?Sized + 'static>(kind: Kind) -> Self {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
            kind,
            elem: None,
            encode: None,
            decode: None,
            probe: None,
        }
    }

    /// Describe the `Arc<S>` receiver of a service method.
    pub fn receiver<S: Send + Sync + 'static>() -> Self {
        let mut info = Self::of::<std::sync::Arc<S>>(Kind::Pointer);
        info.elem = Some(struct_info::<S>);
        info
    }

    /// Override the display name.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Attach a JSON encoder for values of `T`.
    pub fn with_encoder<T: Serialize + 'static>(mut self) -> Self {
        self.encode = Some(encode_as::<T>);
        self
    }

    pub fn with_elem(mut self, elem: fn() -> TypeInfo) -> Self {
        self.elem = Some(elem);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Pointee of a pointer, element of a slice.
    pub fn elem(&self) -> Option<TypeInfo> {
        self.elem.map(|elem| elem())
    }

    /// Whether this describes exactly `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn is_pointer(&self) -> bool {
        self.kind == Kind::Pointer
    }

    /// Whether request bodies can be decoded into this type.
    pub fn is_decodable(&self) -> bool {
        self.decode.is_some()
    }

    /// Serialize the zero value of the pointee to check it has a JSON form.
    ///
    /// Types without a probe (everything except `Box<T: Payload>`) pass.
    pub fn probe(&self) -> Result<(), String> {
        match self.probe {
            Some(probe) => probe().map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }

    /// Encode a value of this type to JSON.
    pub fn encode(&self, value: &(dyn Any + Send)) -> Result<serde_json::Value, EncodeError> {
        let encode = self
            .encode
            .ok_or_else(|| custom_error(format!("{} has no JSON encoder", self.name)))?;
        Ok(encode(value)?)
    }

    /// Decode a JSON document into a fresh value of this type.
    pub fn decode(&self, bytes: &[u8]) -> serde_json::Result<Erased> {
        match self.decode {
            Some(decode) => decode(bytes),
            None => Err(custom_error(format!("{} has no JSON decoder", self.name))),
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Types that can appear in a service method signature.
pub trait Describe: Send + Sized + 'static {
    fn type_info() -> TypeInfo;
}

/// Resource data types that can travel as request and response bodies.
///
/// The pointee of the PayloadType. `Default` provides the zero value used by
/// the serializability probe at registration time.
pub trait Payload: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    fn payload_kind() -> Kind {
        Kind::Struct
    }
}

fn struct_info<S: 'static>() -> TypeInfo {
    TypeInfo::of::<S>(Kind::Struct)
}

fn payload_info<T: Payload>() -> TypeInfo {
    TypeInfo::of::<T>(T::payload_kind()).with_encoder::<T>()
}

fn custom_error(message: String) -> serde_json::Error {
    <serde_json::Error as serde::ser::Error>::custom(message)
}

fn encode_as<T: Serialize + 'static>(value: &(dyn Any + Send)) -> serde_json::Result<serde_json::Value> {
    match value.downcast_ref::<T>() {
        Some(value) => json::to_value(value),
        None => Err(custom_error(format!(
            "value is not a {}",
            type_name::<T>()
        ))),
    }
}

fn decode_boxed<T: Payload>(bytes: &[u8]) -> serde_json::Result<Erased> {
    let value: Box<T> = Box::new(serde_json::from_slice(bytes)?);
    Ok(Box::new(value))
}

fn probe_default<T: Payload>() -> serde_json::Result<()> {
    json::to_value(&T::default()).map(|_| ())
}

macro_rules! describe_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<$ty>(Kind::$kind).with_encoder::<$ty>()
                }
            }

            impl Payload for $ty {
                fn payload_kind() -> Kind {
                    Kind::$kind
                }
            }
        )*
    };
}

describe_primitive!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    isize => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    usize => Uint,
    f32 => Float,
    f64 => Float,
    String => String,
);

impl Describe for () {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<()>(Kind::Unit).with_encoder::<()>()
    }
}

impl Describe for Context {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Context>(Kind::Struct).named("Context")
    }
}

impl Describe for QueryArgs {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<QueryArgs>(Kind::Map)
            .named("QueryArgs")
            .with_encoder::<QueryArgs>()
    }
}

impl Describe for BoxError {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<BoxError>(Kind::Interface).named("BoxError")
    }
}

impl<T: Payload> Describe for Box<T> {
    fn type_info() -> TypeInfo {
        let mut info = TypeInfo::of::<Box<T>>(Kind::Pointer)
            .with_elem(payload_info::<T>)
            .with_encoder::<Box<T>>();
        info.decode = Some(decode_boxed::<T>);
        info.probe = Some(probe_default::<T>);
        info
    }
}

impl<T: Describe + Serialize> Describe for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Vec<T>>(Kind::Slice)
            .with_elem(T::type_info)
            .with_encoder::<Vec<T>>()
    }
}
