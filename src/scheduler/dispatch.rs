use log::debug;

use super::MlfqConfig;
use crate::core::{Level, SchedEvent, SchedState, TaskId};

/// Highest non-empty tier wins: Q0 hands out its minimum key, Q1 and Q2
/// their head.
pub fn pick_next(ctx: &mut SchedState) -> Option<TaskId> {
    Level::ALL.into_iter().find_map(|level| ctx.dsq_pop(level))
}

/// Fill an idle CPU. Leaves it idle when every queue is empty.
pub fn dispatch(ctx: &mut SchedState, config: &MlfqConfig, events: &mut Vec<SchedEvent>) {
    if !ctx.cpu_is_idle() {
        return;
    }

    let Some(task) = pick_next(ctx) else {
        events.push(SchedEvent::Idle);
        return;
    };

    let level = ctx.task(task).level;
    let slice = config.slice_for(level);
    let first = ctx.set_running(task, slice);
    debug!(
        "t={} dispatch {} from {} slice={:?}",
        ctx.now,
        ctx.task(task).pid,
        level,
        slice
    );
    events.push(SchedEvent::Dispatched {
        task,
        level,
        slice,
        first,
    });
}
