use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{Level, TaskId, Ticks};

pub type Pid = String;

/// Workload class; decides the tier a process first lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessType {
    Rt,
    Interactive,
    Batch,
}

impl ProcessType {
    pub fn initial_level(self) -> Level {
        match self {
            ProcessType::Rt => Level::Priority,
            ProcessType::Interactive => Level::RoundRobin,
            ProcessType::Batch => Level::Fcfs,
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessType::Rt => "RT",
            ProcessType::Interactive => "INTERACTIVE",
            ProcessType::Batch => "BATCH",
        };
        // pad() honors width specifiers
        f.pad(name)
    }
}

/// Process descriptor as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub pid: Pid,
    pub arrival: Ticks,
    pub burst: Ticks,
    // Lower is more urgent
    pub base_priority: i32,
    pub ptype: ProcessType,
}

impl Job {
    pub fn new(
        pid: &str,
        arrival: Ticks,
        burst: Ticks,
        base_priority: i32,
        ptype: ProcessType,
    ) -> Self {
        Self {
            pid: pid.to_owned(),
            arrival,
            burst,
            base_priority,
            ptype,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobInstance {
    pub job: Job,
    // Set once the job has arrived
    pub task: Option<TaskId>,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
    pub waiting: Ticks,
}

impl JobInstance {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            task: None,
            start_time: None,
            completion_time: None,
            waiting: 0,
        }
    }
}

/// The stock six-process mix: two real-time, two interactive, two batch.
pub fn demo_jobs() -> Vec<Job> {
    vec![
        Job::new("P1", 0, 7, 2, ProcessType::Rt),
        Job::new("P2", 1, 6, 1, ProcessType::Rt),
        Job::new("P3", 2, 8, 5, ProcessType::Interactive),
        Job::new("P4", 3, 5, 6, ProcessType::Interactive),
        Job::new("P5", 4, 10, 9, ProcessType::Batch),
        Job::new("P6", 6, 4, 8, ProcessType::Batch),
    ]
}
