use crate::core::{Level, TaskId, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedEvent {
    Arrived {
        task: TaskId,
        level: Level,
    },
    Promoted {
        task: TaskId,
        from: Level,
        to: Level,
    },
    // Returned to its own tier because `by` is waiting in Q0
    Preempted {
        task: TaskId,
        level: Level,
        by: TaskId,
    },
    Dispatched {
        task: TaskId,
        level: Level,
        slice: Option<Ticks>,
        first: bool,
    },
    // Used a full Q1 quantum, demoted to Q2
    QuantumExpired {
        task: TaskId,
    },
    Completed {
        task: TaskId,
        at: Ticks,
    },
    // CPU idle even after dispatch
    Idle,
}
