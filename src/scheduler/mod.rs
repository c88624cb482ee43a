pub mod aging;
pub mod dispatch;
pub mod preempt;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::core::{Level, SchedEvent, SchedState, TaskId, Ticks};
use crate::error::{ConfigError, SimResult};

pub const DEFAULT_RR_QUANTUM: Ticks = 3;
pub const DEFAULT_AGING_THRESHOLD: Ticks = 8;

/// Tunables of the three-tier policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlfqConfig {
    /// Consecutive ticks a Q1 task may run before it is demoted to Q2.
    pub rr_quantum: Ticks,
    /// Ticks a Q1/Q2 task may sit queued before it moves up one tier.
    pub aging_threshold: Ticks,
}

impl Default for MlfqConfig {
    fn default() -> Self {
        Self {
            rr_quantum: DEFAULT_RR_QUANTUM,
            aging_threshold: DEFAULT_AGING_THRESHOLD,
        }
    }
}

impl MlfqConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.rr_quantum == 0 {
            return Err(ConfigError::ZeroQuantum.into());
        }
        if self.aging_threshold == 0 {
            return Err(ConfigError::ZeroAgingThreshold.into());
        }
        Ok(())
    }

    /// Time budget handed out on dispatch. Only the round robin tier is
    /// time-sliced; Q0 and Q2 run until completion or preemption.
    pub fn slice_for(&self, level: Level) -> Option<Ticks> {
        match level {
            Level::RoundRobin => Some(self.rr_quantum),
            Level::Priority | Level::Fcfs => None,
        }
    }
}

/// Multi-level feedback queue policy: preemptive priority on Q0, round robin
/// on Q1, FCFS on Q2, with aging between tiers.
#[derive(Debug)]
pub struct Mlfq {
    config: MlfqConfig,
}

impl Mlfq {
    pub fn new(config: MlfqConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MlfqConfig {
        &self.config
    }

    /// Place a newly arrived task on its initial tier.
    pub fn admit(
        &mut self,
        ctx: &mut SchedState,
        task: TaskId,
        level: Level,
        events: &mut Vec<SchedEvent>,
    ) {
        ctx.enqueue(task, level);
        trace!("t={} {} arrived on {}", ctx.now, ctx.task(task).pid, level);
        events.push(SchedEvent::Arrived { task, level });
    }

    pub fn age(&mut self, ctx: &mut SchedState, events: &mut Vec<SchedEvent>) {
        aging::apply_aging(ctx, self.config.aging_threshold, events);
    }

    pub fn preempt(&mut self, ctx: &mut SchedState, events: &mut Vec<SchedEvent>) {
        preempt::preempt_if_needed(ctx, events);
    }

    pub fn dispatch(&mut self, ctx: &mut SchedState, events: &mut Vec<SchedEvent>) {
        dispatch::dispatch(ctx, &self.config, events);
    }
}
