use serde::Serialize;

use super::event::SchedEvent;
use super::state::{Level, SchedState, TaskState};

/// Scheduling activity counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedStats {
    pub dispatches: u64,
    pub preemptions: u64,
    pub promotions: u64,
    pub demotions: u64,
    pub idle_ticks: u64,
}

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    stats: SchedStats,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SchedStats {
        self.stats
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn record(&mut self, events: &[SchedEvent]) {
        for event in events {
            match event {
                SchedEvent::Dispatched { .. } => self.stats.dispatches += 1,
                SchedEvent::Preempted { .. } => self.stats.preemptions += 1,
                SchedEvent::Promoted { .. } => self.stats.promotions += 1,
                SchedEvent::QuantumExpired { .. } => self.stats.demotions += 1,
                SchedEvent::Idle => self.stats.idle_ticks += 1,
                SchedEvent::Arrived { .. } | SchedEvent::Completed { .. } => {}
            }
        }
    }

    pub fn observe(&mut self, core: &SchedState) {
        self.step += 1;

        if let Some(running) = core.running {
            let task = core.task(running.task);
            debug_assert_eq!(
                task.state,
                TaskState::Running,
                "running task {} must be Running",
                task.pid
            );
            debug_assert!(
                task.remaining > 0,
                "running task {} has no work left",
                task.pid
            );
            if let Some(slice) = running.slice_left {
                debug_assert_eq!(
                    task.level,
                    Level::RoundRobin,
                    "only Q1 tasks run on a bounded slice"
                );
                debug_assert!(slice > 0, "task {} kept the CPU past its slice", task.pid);
            }
        }

        for (&task_id, &level) in &core.task_to_dsq {
            let task = core.task(task_id);
            debug_assert_eq!(
                task.state,
                TaskState::Runnable,
                "queued task {} must be Runnable",
                task.pid
            );
            debug_assert_eq!(
                task.level, level,
                "task {} queue_level disagrees with its DSQ",
                task.pid
            );
            debug_assert!(
                core.dsq(level).contains(task_id),
                "task_to_dsq claims task {} in {level}, but queue does not contain it",
                task.pid
            );
        }

        let queued: usize = Level::ALL.iter().map(|&l| core.dsq(l).len()).sum();
        debug_assert_eq!(queued, core.task_to_dsq.len(), "DSQ membership drifted");

        for task in &core.tasks {
            if task.state == TaskState::Completed {
                debug_assert_eq!(
                    task.completion_time.map(|c| c - task.arrival),
                    Some(task.waiting + task.required_service),
                    "task {} broke time conservation",
                    task.pid
                );
            }
        }
    }
}
