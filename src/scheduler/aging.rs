use log::debug;

use crate::core::{Level, SchedEvent, SchedState, Ticks};

/// Move every task that sat queued for `threshold` ticks up one tier.
///
/// Q2 is aged before Q1. A task promoted into Q1 here is stamped with the
/// current tick, so it cannot also reach Q0 on the same tick.
pub fn apply_aging(ctx: &mut SchedState, threshold: Ticks, events: &mut Vec<SchedEvent>) {
    for from in [Level::Fcfs, Level::RoundRobin] {
        promote_starved(ctx, from, threshold, events);
    }
}

fn promote_starved(
    ctx: &mut SchedState,
    from: Level,
    threshold: Ticks,
    events: &mut Vec<SchedEvent>,
) {
    let Some(to) = from.promoted() else {
        return;
    };

    let now = ctx.now;
    let starved = ctx.dsq_extract(from, |task| {
        now.saturating_sub(task.last_enqueued) >= threshold
    });

    for task in starved {
        ctx.enqueue(task, to);
        debug!("t={now} {} aged {from} -> {to}", ctx.task(task).pid);
        events.push(SchedEvent::Promoted { task, from, to });
    }
}
