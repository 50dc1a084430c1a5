//! Thread-safety bounds that relax on `wasm32`.
//!
//! Collaborator futures and the validator's own futures are `Send` on
//! native targets, so validation can run on a multi-threaded executor.
//! Browser keystores hand out `!Send` futures, so on `wasm32` these bounds
//! are empty.

/// `Send` on native targets, no bound on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> ConditionalSend for T {}

/// `Send + Sync` on native targets, no bound on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> ConditionalSync for T {}

/// `Send` on native targets, no bound on `wasm32`.
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSend {}

#[cfg(target_arch = "wasm32")]
impl<T> ConditionalSend for T {}

/// `Send + Sync` on native targets, no bound on `wasm32`.
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSync {}

#[cfg(target_arch = "wasm32")]
impl<T> ConditionalSync for T {}

/// Boxed future that is `Send` wherever [`ConditionalSend`] requires it.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) type MaybeBoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;

/// Boxed future that is `Send` wherever [`ConditionalSend`] requires it.
#[cfg(target_arch = "wasm32")]
pub(crate) type MaybeBoxFuture<'a, T> = futures::future::LocalBoxFuture<'a, T>;

/// Boxes `future` as a [`MaybeBoxFuture`].
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn boxed<'a, F>(future: F) -> MaybeBoxFuture<'a, F::Output>
where
    F: std::future::Future + Send + 'a,
{
    futures::FutureExt::boxed(future)
}

/// Boxes `future` as a [`MaybeBoxFuture`].
#[cfg(target_arch = "wasm32")]
pub(crate) fn boxed<'a, F>(future: F) -> MaybeBoxFuture<'a, F::Output>
where
    F: std::future::Future + 'a,
{
    futures::FutureExt::boxed_local(future)
}
