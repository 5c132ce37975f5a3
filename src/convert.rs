//! # Conversions
//!
//! Every concrete `chat_service` resource has exactly one [`IntoAbstraction`]
//! impl producing the most specific boxed abstraction for it. The impls are
//! pure: they move the resource into a new wrapper and never touch the
//! network.
//!
//! Containers convert element-wise:
//!
//! - `Option<T>` maps absent to absent.
//! - `Vec<T>` keeps the original order.
//! - [`abstract_stream`] converts each item of an [`ItemStream`] as it is
//!   produced, so consumption still drives the fetching.

use chat_service::ItemStream;
use futures::{StreamExt, TryStreamExt};

/// Conversion from a concrete resource into its abstraction.
pub trait IntoAbstraction {
    type Output;

    fn into_abstraction(self) -> Self::Output;
}

impl<T: IntoAbstraction> IntoAbstraction for Option<T> {
    type Output = Option<T::Output>;

    fn into_abstraction(self) -> Self::Output {
        self.map(IntoAbstraction::into_abstraction)
    }
}

impl<T: IntoAbstraction> IntoAbstraction for Vec<T> {
    type Output = Vec<T::Output>;

    fn into_abstraction(self) -> Self::Output {
        self.into_iter().map(IntoAbstraction::into_abstraction).collect()
    }
}

/// Convert every item of a stream, lazily.
pub fn abstract_stream<T>(items: ItemStream<T>) -> ItemStream<T::Output>
where
    T: IntoAbstraction + Send + 'static,
    T::Output: Send + 'static,
{
    items.map_ok(IntoAbstraction::into_abstraction).boxed()
}

/// Re-type every item of a stream, lazily. Used to widen REST-typed streams
/// to their platform-typed counterparts.
pub(crate) fn widen_stream<T, U>(items: ItemStream<T>, widen: fn(T) -> U) -> ItemStream<U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    items.map_ok(widen).boxed()
}
