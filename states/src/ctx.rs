use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flume::{Receiver, Sender};
use tokio_util::sync::CancellationToken;

use crate::{
    Command, CommandSnapshot, Compute, LatestOnlyUpdater, State, TaskHandle, TaskId, Updater,
};

/// Owner of all registered states, compute caches and commands.
///
/// Single-threaded by design: the UI thread owns the context, edits states,
/// dispatches commands, and applies published updates via [`Self::sync_computes`]
/// once per frame. Command futures run on the Tokio runtime (native) or the
/// JS microtask queue (wasm) and only talk back through the flume channel.
pub struct StateCtx {
    states: BTreeMap<TypeId, Box<dyn State>>,
    computes: BTreeMap<TypeId, Box<dyn Compute>>,
    commands: BTreeMap<TypeId, Box<dyn Command>>,

    /// Per-command dispatch counters backing the latest-only updaters.
    generations: BTreeMap<TypeId, Arc<AtomicU64>>,
    queue: VecDeque<TypeId>,

    send: Sender<(TypeId, Box<dyn Any + Send>)>,
    recv: Receiver<(TypeId, Box<dyn Any + Send>)>,

    handles: Vec<TaskHandle>,
    #[cfg(not(target_arch = "wasm32"))]
    tasks: tokio::task::JoinSet<()>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            computes: BTreeMap::new(),
            commands: BTreeMap::new(),
            generations: BTreeMap::new(),
            queue: VecDeque::new(),
            send,
            recv,
            handles: Vec::new(),
            #[cfg(not(target_arch = "wasm32"))]
            tasks: tokio::task::JoinSet::new(),
        }
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(TypeId::of::<T>(), Box::new(state));
    }

    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        self.computes.insert(TypeId::of::<T>(), Box::new(compute));
    }

    pub fn record_command<T: Command>(&mut self, command: T) {
        self.commands.insert(TypeId::of::<T>(), Box::new(command));
    }

    /// Shared read access to a registered state.
    ///
    /// # Panics
    /// Panics when `T` was never registered; registration happens once during
    /// app setup, so a miss is a wiring bug.
    pub fn state<T: State>(&self) -> &T {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("state not registered: {}", type_name::<T>()))
    }

    /// Exclusive access to a registered state, for direct UI edits.
    ///
    /// # Panics
    /// Panics when `T` was never registered.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|state| state.as_any_mut().downcast_mut::<T>())
            .unwrap_or_else(|| panic!("state not registered: {}", type_name::<T>()))
    }

    /// Edit a state in place.
    pub fn update<T: State>(&mut self, edit: impl FnOnce(&mut T)) {
        edit(self.state_mut::<T>());
    }

    /// The current value of a compute cache, if registered.
    pub fn cached<T: Compute>(&self) -> Option<&T> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|compute| compute.as_any().downcast_ref::<T>())
    }

    /// Like [`Self::cached`] but panicking on a missing registration.
    /// Test-side convenience.
    pub fn compute<T: Compute>(&self) -> &T {
        self.cached::<T>()
            .unwrap_or_else(|| panic!("compute not registered: {}", type_name::<T>()))
    }

    /// An ungated updater publishing into this context.
    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Bump the generation for `T` and return an updater gated on it.
    ///
    /// Dispatching normally does this internally; exposed so tests can hold a
    /// "previous dispatch" updater and assert its updates get dropped.
    pub fn begin_command<T: Command>(&mut self) -> LatestOnlyUpdater {
        let (generation, latest) = self.bump_generation(TypeId::of::<T>());
        LatestOnlyUpdater::new(self.updater(), generation, latest)
    }

    /// Queue a command for the next [`Self::flush_commands`].
    pub fn enqueue_command<T: Command>(&mut self) {
        self.queue.push_back(TypeId::of::<T>());
    }

    /// Queue a command and flush immediately.
    pub fn dispatch<T: Command>(&mut self) {
        self.enqueue_command::<T>();
        self.flush_commands();
    }

    /// Run every queued command: snapshot the context, hand each command its
    /// gated updater and cancellation token, and spawn the returned future.
    ///
    /// On native this spawns into a `JoinSet` and must be called from within
    /// a Tokio runtime.
    pub fn flush_commands(&mut self) {
        self.handles.retain(|handle| !handle.is_cancelled());

        while let Some(id) = self.queue.pop_front() {
            let snap = self.snapshot();
            let (generation, latest) = self.bump_generation(id);
            let updater = LatestOnlyUpdater::new(self.updater(), generation, latest);
            let token = CancellationToken::new();

            let fut = match self.commands.get(&id) {
                Some(command) => command.run(snap, updater, token.clone()),
                None => {
                    log::error!("flush_commands: command {id:?} not registered, dropping");
                    continue;
                }
            };

            self.handles
                .push(TaskHandle::new(TaskId::new(id, generation), token));

            #[cfg(not(target_arch = "wasm32"))]
            self.tasks.spawn(fut);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(fut);
        }
    }

    /// Apply every published update. Call once per frame before rendering.
    pub fn sync_computes(&mut self) {
        while let Ok((id, boxed)) = self.recv.try_recv() {
            if let Some(compute) = self.computes.get_mut(&id) {
                compute.assign_box(boxed);
            } else if let Some(state) = self.states.get_mut(&id) {
                state.assign_box(boxed);
            } else {
                log::warn!("sync_computes: update for unregistered type {id:?} dropped");
            }
        }
    }

    /// Number of command futures still running (always 0 on wasm, where tasks
    /// are detached onto the JS queue).
    pub fn task_count(&self) -> usize {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.tasks.len()
        }
        #[cfg(target_arch = "wasm32")]
        {
            0
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn task_set_mut(&mut self) -> &mut tokio::task::JoinSet<()> {
        &mut self.tasks
    }

    /// Cancel every outstanding command and wait for the tasks to wind down.
    pub async fn shutdown(&mut self) {
        for handle in &self.handles {
            handle.cancel();
        }
        self.handles.clear();

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.tasks.abort_all();
            while self.tasks.join_next().await.is_some() {}
        }
    }

    fn snapshot(&self) -> CommandSnapshot {
        let mut snap = CommandSnapshot::default();
        for (id, state) in &self.states {
            if let Some(cloned) = state.clone_boxed() {
                snap.insert_state(*id, cloned);
            }
        }
        for (id, compute) in &self.computes {
            if let Some(cloned) = compute.clone_boxed() {
                snap.insert_compute(*id, cloned);
            }
        }
        snap
    }

    fn bump_generation(&mut self, id: TypeId) -> (u64, Arc<AtomicU64>) {
        let counter = self.generations.entry(id).or_default();
        let generation = counter.fetch_add(1, Ordering::AcqRel) + 1;
        (generation, Arc::clone(counter))
    }
}
