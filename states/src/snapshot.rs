use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;

use crate::{Compute, State};

/// Immutable copies of all snapshot-capable states and computes, taken when a
/// command is dispatched.
///
/// Commands read exclusively from their snapshot; the live context may change
/// while the command's future runs.
#[derive(Default)]
pub struct CommandSnapshot {
    states: BTreeMap<TypeId, Box<dyn Any + Send>>,
    computes: BTreeMap<TypeId, Box<dyn Any + Send>>,
}

impl CommandSnapshot {
    pub(crate) fn insert_state(&mut self, id: TypeId, value: Box<dyn Any + Send>) {
        self.states.insert(id, value);
    }

    pub(crate) fn insert_compute(&mut self, id: TypeId, value: Box<dyn Any + Send>) {
        self.computes.insert(id, value);
    }

    /// Copy of a state at dispatch time.
    ///
    /// # Panics
    /// Panics when the state was never registered (or opted out of
    /// snapshotting) — that is a wiring bug, not a runtime condition.
    pub fn state<T: State + Clone + Send + 'static>(&self) -> T {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .cloned()
            .unwrap_or_else(|| panic!("state snapshot for {} is missing", type_name::<T>()))
    }

    /// Copy of a compute cache at dispatch time.
    ///
    /// # Panics
    /// Panics when the compute was never registered.
    pub fn compute<T: Compute + Clone + Send + 'static>(&self) -> T {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .cloned()
            .unwrap_or_else(|| panic!("compute snapshot for {} is missing", type_name::<T>()))
    }
}
