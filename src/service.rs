//! The trait resource services implement to be mounted on a router.

use crate::signature::MethodSet;

/// A resource service exposing its methods by name.
///
/// The router validates the set against the CRUD contract before mounting
/// anything:
///
/// | Method | Signature |
/// |---|---|
/// | `Get` | `(Arc<Self>, Context, i64) -> Result<Box<T>, BoxError>` |
/// | `Put` | `(Arc<Self>, Context, i64, Box<T>) -> Result<(), BoxError>` |
/// | `New` | `(Arc<Self>, Context, Box<T>) -> Result<i64, BoxError>` |
/// | `Delete` | `(Arc<Self>, Context, i64) -> Result<(), BoxError>` |
/// | `List` (optional) | `(Arc<Self>, Context, QueryArgs) -> Result<Vec<Box<T>>, BoxError>` |
///
/// `T` is the same [`Payload`](crate::Payload) type throughout, fixed by `Get`.
///
/// ```ignore
/// impl Service for Notes {
///     fn methods() -> MethodSet<Self> {
///         MethodSet::new()
///             .method("Get", Notes::get)
///             .method("Put", Notes::put)
///             .method("New", Notes::new_note)
///             .method("Delete", Notes::delete)
///     }
/// }
/// ```
pub trait Service: Send + Sync + Sized + 'static {
    fn methods() -> MethodSet<Self>;
}
