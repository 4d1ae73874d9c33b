use std::any::Any;

/// A plain mutable value registered in a [`crate::StateCtx`].
///
/// States are edited in place by the UI (`state_mut`/`update`) and cloned
/// into [`crate::CommandSnapshot`]s when a command starts, so a running
/// command never observes later edits.
pub trait State: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clone for snapshotting. Return `None` to keep a state out of command
    /// snapshots (commands then cannot read it).
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>>;

    /// Replace `self` with a boxed new value of the same concrete type.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Shared `assign_box` body for [`State`] implementations.
///
/// A type mismatch is a wiring bug (an updater published under the wrong
/// `TypeId`); it is logged and the old value kept rather than panicking the
/// UI thread.
pub fn state_assign_impl<T: 'static>(this: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(new_self) => *this = *new_self,
        Err(_) => log::error!(
            "assign_box: type mismatch for {}, keeping previous value",
            std::any::type_name::<T>()
        ),
    }
}
