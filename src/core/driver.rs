use log::trace;

use super::{
    event::SchedEvent,
    observer::{Observer, SchedStats},
    state::{Level, SchedState, TaskId, Ticks},
};
use crate::scheduler::{Mlfq, MlfqConfig};

pub struct SchedCore {
    pub ctx: SchedState,
    pub scheduler: Mlfq,
    observer: Observer,
}

impl SchedCore {
    pub fn new(config: MlfqConfig) -> Self {
        Self {
            ctx: SchedState::new(),
            scheduler: Mlfq::new(config),
            observer: Observer::new(),
        }
    }

    /// Release a task that arrives on the current tick.
    pub fn admit(&mut self, task: TaskId, level: Level, events: &mut Vec<SchedEvent>) {
        self.scheduler.admit(&mut self.ctx, task, level, events);
    }

    /// Run the rest of the current tick once arrivals are in: age, preempt,
    /// dispatch, charge waiting time, execute one unit, then advance the
    /// clock.
    pub fn tick(&mut self, events: &mut Vec<SchedEvent>) {
        self.scheduler.age(&mut self.ctx, events);
        self.scheduler.preempt(&mut self.ctx, events);
        self.scheduler.dispatch(&mut self.ctx, events);

        self.ctx.charge_queued_wait();
        self.run_current(events);

        self.ctx.advance_time(1);
        self.observer.record(events);
        self.observer.observe(&self.ctx);
    }

    // Execute one unit of the task holding the CPU and release the CPU if it
    // completed or used up its Q1 slice
    fn run_current(&mut self, events: &mut Vec<SchedEvent>) {
        let Some(mut running) = self.ctx.running else {
            return;
        };
        let now = self.ctx.now;
        self.ctx.busy_ticks += 1;

        // In its own block to avoid double-mutable-borrow
        let (remaining, level) = {
            let task = self.ctx.task_mut(running.task);
            task.remaining = task.remaining.saturating_sub(1);
            (task.remaining, task.level)
        };
        if let Some(slice) = running.slice_left.as_mut() {
            *slice = slice.saturating_sub(1);
        }

        if remaining == 0 {
            self.ctx.clear_cpu();
            self.ctx.mark_completed(running.task, now + 1);
            trace!("t={now} {} completed", self.ctx.task(running.task).pid);
            events.push(SchedEvent::Completed {
                task: running.task,
                at: now + 1,
            });
            return;
        }

        // Quantum expiry is a demotion, not a preemption: the task goes to the
        // back of Q2 no matter what else is ready.
        if level == Level::RoundRobin && running.slice_left == Some(0) {
            self.ctx.clear_cpu();
            self.ctx.enqueue(running.task, Level::Fcfs);
            trace!(
                "t={now} {} used its quantum, demoted to Q2",
                self.ctx.task(running.task).pid
            );
            events.push(SchedEvent::QuantumExpired { task: running.task });
            return;
        }

        self.ctx.running = Some(running);
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn stats(&self) -> SchedStats {
        self.observer.stats()
    }
}
