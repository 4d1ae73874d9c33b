use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::{CommandSnapshot, LatestOnlyUpdater};

/// The boxed future a command hands back to the runtime.
///
/// Send on every platform: on wasm the HTTP layer hops to the JS thread
/// internally, so command futures themselves stay Send-safe.
pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// An async unit of work dispatched explicitly from the UI.
///
/// `run` must not block: it reads what it needs from the snapshot, then
/// returns a future that performs the work and publishes outcomes through the
/// updater. Long-running work should poll `cancel` at its await points so
/// shutdown stays prompt.
pub trait Command: Any {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> CommandFuture;
}
