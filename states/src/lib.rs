//! Typed application state for the streams client.
//!
//! Three kinds of registered values live in a [`StateCtx`]:
//!
//! - [`State`]: plain mutable values the UI edits directly (form inputs,
//!   configuration).
//! - [`Compute`]: result caches shaped like derived values. Their content is
//!   only ever replaced through an [`Updater`], never mutated in place by the
//!   UI. Side effects (network IO) must not live in computes; they live in
//!   commands and publish into computes.
//! - [`Command`]: async units of work. A command receives an immutable
//!   [`CommandSnapshot`] of all states and computes, a [`LatestOnlyUpdater`]
//!   to publish results, and a `CancellationToken` for cooperative shutdown.
//!
//! The UI loop calls [`StateCtx::sync_computes`] once per frame to drain
//! published updates, renders from the current values, and dispatches
//! commands in response to user actions.

mod command;
mod compute;
mod ctx;
mod snapshot;
mod state;
mod task;
mod updater;

pub use command::{Command, CommandFuture};
pub use compute::{Compute, assign_impl};
pub use ctx::StateCtx;
pub use snapshot::CommandSnapshot;
pub use state::{State, state_assign_impl};
pub use task::{TaskHandle, TaskId};
pub use updater::{LatestOnlyUpdater, Updater};
