use log::debug;

use crate::core::{Level, SchedEvent, SchedState};

/// Take the CPU away from the running task if Q0 holds something more
/// urgent. The preempted task keeps its tier and its remaining work.
///
/// - Q1/Q2 task, Q0 non-empty: back to the head of its own queue.
/// - Q0 task, Q0 head has a strictly smaller base priority: back into Q0.
pub fn preempt_if_needed(ctx: &mut SchedState, events: &mut Vec<SchedEvent>) {
    let Some(running) = ctx.running else {
        return;
    };
    let Some(best) = ctx.dsq_peek(Level::Priority) else {
        return;
    };

    let current = ctx.task(running.task);
    let level = current.level;
    let preempt = match level {
        Level::RoundRobin | Level::Fcfs => true,
        Level::Priority => ctx.task(best).base_priority < current.base_priority,
    };
    if !preempt {
        return;
    }

    ctx.clear_cpu();
    match level {
        Level::RoundRobin | Level::Fcfs => ctx.requeue_front(running.task),
        Level::Priority => ctx.enqueue(running.task, Level::Priority),
    }

    debug!(
        "t={} {} preempted on {} by {}",
        ctx.now,
        ctx.task(running.task).pid,
        level,
        ctx.task(best).pid
    );
    events.push(SchedEvent::Preempted {
        task: running.task,
        level,
        by: best,
    });
}
