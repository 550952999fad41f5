//! Named, type-erased service methods and the signatures they were built from.
//!
//! A [`MethodSet`] is what a [`Service`](crate::Service) exposes: a map from
//! method name to [`Method`]. Each method is registered from an ordinary Rust
//! function or closure whose first parameter is the `Arc<Self>` receiver; the
//! [`Handler`] impls below capture its parameter and return types as a
//! [`Signature`] and wrap it in a callable that downcasts erased arguments
//! back to their concrete types.

use super::types::{Describe, Erased, Kind, Payload, TypeInfo};
use crate::error::{BoxError, InvokeError};
use futures::future::BoxFuture;
use serde::Serialize;
use std::any::type_name;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Parameter and return types of one method.
///
/// `inputs()[0]` is always the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inputs: Vec<TypeInfo>,
    outputs: Vec<TypeInfo>,
}

impl Signature {
    pub fn new(inputs: Vec<TypeInfo>, outputs: Vec<TypeInfo>) -> Self {
        Self { inputs, outputs }
    }

    pub fn inputs(&self) -> &[TypeInfo] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TypeInfo] {
        &self.outputs
    }

    pub fn num_in(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_out(&self) -> usize {
        self.outputs.len()
    }

    pub fn input(&self, position: usize) -> Option<&TypeInfo> {
        self.inputs.get(position)
    }

    pub fn output(&self, position: usize) -> Option<&TypeInfo> {
        self.outputs.get(position)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |types: &[TypeInfo]| {
            types
                .iter()
                .map(TypeInfo::name)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "fn({}) -> ({})", join(&self.inputs), join(&self.outputs))
    }
}

/// Values produced by one invocation, one slot per declared output.
///
/// A slot is empty when the output was not produced, e.g. the value slot of
/// an `Err` result or the error slot of an `Ok` result.
#[derive(Default)]
pub struct Outputs(Vec<Option<Erased>>);

impl Outputs {
    pub fn new(slots: Vec<Option<Erased>>) -> Self {
        Self(slots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the value out of slot `position`.
    pub fn take(&mut self, position: usize) -> Option<Erased> {
        self.0.get_mut(position).and_then(Option::take)
    }

    /// Take the final slot as an error, if one was returned.
    pub fn take_error(&mut self) -> Result<Option<BoxError>, InvokeError> {
        let position = self.0.len().saturating_sub(1);
        match self.0.last_mut().and_then(Option::take) {
            None => Ok(None),
            Some(value) => value
                .downcast::<BoxError>()
                .map(|error| Some(*error))
                .map_err(|_| InvokeError::ReturnType {
                    position,
                    expected: "BoxError",
                }),
        }
    }
}

impl fmt::Debug for Outputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(Option::is_some))
            .finish()
    }
}

/// Return types a service method may have.
///
/// Request-only types such as [`Context`](crate::Context) are not among them:
/// ```compile_fail
/// use lazy_rest::{Context, MethodSet};
/// use std::sync::Arc;
///
/// struct Echo;
///
/// async fn bounce(_: Arc<Echo>, ctx: Context) -> Context {
///     ctx
/// }
///
/// let _ = MethodSet::<Echo>::new().method("Get", bounce);
/// ```
pub trait Returns: Send + 'static {
    fn outputs() -> Vec<TypeInfo>;
    fn into_outputs(self) -> Outputs;
}

impl Returns for () {
    fn outputs() -> Vec<TypeInfo> {
        Vec::new()
    }

    fn into_outputs(self) -> Outputs {
        Outputs::default()
    }
}

/// `Result<T, E>` yields `[T, E]`, or just `[E]` when `T` is `()`.
impl<T: Describe, E: Describe> Returns for Result<T, E> {
    fn outputs() -> Vec<TypeInfo> {
        let value = T::type_info();
        if value.kind() == Kind::Unit {
            vec![E::type_info()]
        } else {
            vec![value, E::type_info()]
        }
    }

    fn into_outputs(self) -> Outputs {
        let unit = T::type_info().kind() == Kind::Unit;
        let slots: Vec<Option<Erased>> = match self {
            Ok(_) if unit => vec![None],
            Ok(value) => vec![Some(Box::new(value)), None],
            Err(error) if unit => vec![Some(Box::new(error))],
            Err(error) => vec![None, Some(Box::new(error))],
        };
        Outputs(slots)
    }
}

impl<A: Describe, B: Describe> Returns for (A, B) {
    fn outputs() -> Vec<TypeInfo> {
        vec![A::type_info(), B::type_info()]
    }

    fn into_outputs(self) -> Outputs {
        Outputs(vec![Some(Box::new(self.0)), Some(Box::new(self.1))])
    }
}

macro_rules! returns_single {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Returns for $ty {
                fn outputs() -> Vec<TypeInfo> {
                    vec![<$ty as Describe>::type_info()]
                }

                fn into_outputs(self) -> Outputs {
                    Outputs(vec![Some(Box::new(self))])
                }
            }
        )*
    };
}

returns_single!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, BoxError,
);

impl<T: Payload> Returns for Box<T> {
    fn outputs() -> Vec<TypeInfo> {
        vec![<Box<T> as Describe>::type_info()]
    }

    fn into_outputs(self) -> Outputs {
        Outputs(vec![Some(Box::new(self))])
    }
}

impl<T: Describe + Serialize> Returns for Vec<T> {
    fn outputs() -> Vec<TypeInfo> {
        vec![<Vec<T> as Describe>::type_info()]
    }

    fn into_outputs(self) -> Outputs {
        Outputs(vec![Some(Box::new(self))])
    }
}

/// Functions usable as methods of receiver `S`.
///
/// Implemented for `Fn(Arc<S>, A1, .., An) -> impl Future` with up to four
/// arguments after the receiver. `Args` only disambiguates the arities.
pub trait Handler<S, Args>: Send + Sync + 'static {
    fn signature() -> Signature;

    /// Downcast `args` and start the call.
    fn call(
        &self,
        receiver: Arc<S>,
        args: Vec<Erased>,
    ) -> Result<BoxFuture<'static, Outputs>, InvokeError>;
}

fn take_arg<T: Describe>(position: usize, value: Option<Erased>) -> Result<T, InvokeError> {
    value
        .and_then(|value| value.downcast::<T>().ok())
        .map(|value| *value)
        .ok_or(InvokeError::ArgumentType {
            position,
            expected: type_name::<T>(),
        })
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        impl<S, F, Fut, R, $($arg,)*> Handler<S, ($($arg,)*)> for F
        where
            S: Send + Sync + 'static,
            F: Fn(Arc<S>, $($arg,)*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: Returns,
            $($arg: Describe,)*
        {
            fn signature() -> Signature {
                Signature::new(
                    vec![TypeInfo::receiver::<S>() $(, <$arg as Describe>::type_info())*],
                    R::outputs(),
                )
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(
                &self,
                receiver: Arc<S>,
                args: Vec<Erased>,
            ) -> Result<BoxFuture<'static, Outputs>, InvokeError> {
                let expected = count!($($arg)*);
                if args.len() != expected {
                    return Err(InvokeError::ArgumentCount {
                        expected,
                        found: args.len(),
                    });
                }
                let mut args = args.into_iter();
                let mut position = 0usize;
                $(
                    position += 1;
                    let $arg = take_arg::<$arg>(position, args.next())?;
                )*
                let future = (self)(receiver, $($arg,)*);
                Ok(Box::pin(async move { future.await.into_outputs() }))
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);

type ErasedCall<S> = dyn Fn(Arc<S>, Vec<Erased>) -> Result<BoxFuture<'static, Outputs>, InvokeError>
    + Send
    + Sync;

/// One named method of receiver `S`.
pub struct Method<S> {
    name: String,
    signature: Signature,
    call: Arc<ErasedCall<S>>,
}

impl<S: Send + Sync + 'static> Method<S> {
    pub fn new<H, Args>(name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<S, Args>,
    {
        Self {
            name: name.into(),
            signature: H::signature(),
            call: Arc::new(move |receiver: Arc<S>, args: Vec<Erased>| handler.call(receiver, args)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call the method on `receiver`.
    ///
    /// `args` excludes the receiver and must line up with
    /// `signature().inputs()[1..]`.
    pub async fn invoke(&self, receiver: Arc<S>, args: Vec<Erased>) -> Result<Outputs, InvokeError> {
        let future = (self.call)(receiver, args)?;
        Ok(future.await)
    }

    /// Rebind this method onto an outer receiver that embeds `S`.
    fn promote<O: Send + Sync + 'static>(self, project: fn(&O) -> Arc<S>) -> Method<O> {
        let mut inputs = self.signature.inputs;
        if let Some(receiver) = inputs.first_mut() {
            *receiver = TypeInfo::receiver::<O>();
        }
        let call = self.call;
        Method {
            name: self.name,
            signature: Signature::new(inputs, self.signature.outputs),
            call: Arc::new(move |outer: Arc<O>, args: Vec<Erased>| call(project(&outer), args)),
        }
    }
}

impl<S> Clone for Method<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            signature: self.signature.clone(),
            call: Arc::clone(&self.call),
        }
    }
}

impl<S> fmt::Debug for Method<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// The methods of receiver `S`, by name.
pub struct MethodSet<S> {
    methods: BTreeMap<String, Method<S>>,
}

impl<S: Send + Sync + 'static> MethodSet<S> {
    pub fn new() -> Self {
        Self {
            methods: BTreeMap::new(),
        }
    }

    /// Add a method, replacing any method of the same name.
    pub fn method<H, Args>(mut self, name: &str, handler: H) -> Self
    where
        H: Handler<S, Args>,
    {
        self.methods
            .insert(name.to_string(), Method::new(name, handler));
        self
    }

    /// Promote every method of an embedded service onto `S`.
    ///
    /// `project` picks the embedded receiver out of the outer one. Methods
    /// added to the result afterwards override promoted ones of the same name.
    pub fn embed<I: Send + Sync + 'static>(inner: MethodSet<I>, project: fn(&S) -> Arc<I>) -> Self {
        Self {
            methods: inner
                .methods
                .into_iter()
                .map(|(name, method)| (name, method.promote(project)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Method<S>> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<S: Send + Sync + 'static> Default for MethodSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for MethodSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.methods.iter()).finish()
    }
}
