use std::any::TypeId;

use tokio_util::sync::CancellationToken;

/// Identifier for one dispatch of a command: the command's `TypeId` plus a
/// generation counter. Two dispatches of the same command share a `TypeId`
/// and differ in generation; the higher generation is the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self {
            type_id,
            generation,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A dispatched command's cancellation handle.
///
/// Cancellation is cooperative: `cancel` flips the token and the command
/// notices at its next await point. Clones share the token.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Token to pass into async work that should observe cancellation.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_identity() {
        let type_id = TypeId::of::<String>();

        let first = TaskId::new(type_id, 1);
        let again = TaskId::new(type_id, 1);
        let newer = TaskId::new(type_id, 2);
        let other = TaskId::new(TypeId::of::<i32>(), 1);

        assert_eq!(first, again);
        assert_ne!(first, newer);
        assert_ne!(first, other);
        assert_eq!(newer.generation(), 2);
    }

    #[test]
    fn handle_cancel_is_shared() {
        let handle = TaskHandle::new(
            TaskId::new(TypeId::of::<String>(), 1),
            CancellationToken::new(),
        );
        let clone = handle.clone();

        assert!(!clone.is_cancelled());
        handle.cancel();
        assert!(clone.is_cancelled());
        assert!(handle.cancellation_token().is_cancelled());
    }
}
