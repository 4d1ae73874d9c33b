use std::any::Any;

/// A compute-shaped result cache.
///
/// Computes hold the latest outcome of some unit of work (a fetch, a
/// submission) and are read by the UI via `StateCtx::cached`. They are only
/// ever replaced wholesale through an updater and applied during
/// `StateCtx::sync_computes`; side effects must not run inside a compute —
/// they belong to the command that feeds it.
pub trait Compute: Any {
    fn as_any(&self) -> &dyn Any;

    /// Clone for snapshotting, so commands can read the cache they feed.
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>>;

    /// Replace `self` with a boxed new value of the same concrete type.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Shared `assign_box` body for [`Compute`] implementations.
pub fn assign_impl<T: 'static>(this: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(new_self) => *this = *new_self,
        Err(_) => log::error!(
            "assign_box: type mismatch for {}, keeping previous value",
            std::any::type_name::<T>()
        ),
    }
}
