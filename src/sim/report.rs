use average::{Estimate, Mean};
use log::warn;
use serde::Serialize;

use super::job::{JobInstance, Pid, ProcessType};
use crate::core::{SchedStats, Ticks};

/// Final numbers for one process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    pub pid: Pid,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub base_priority: i32,
    pub ptype: ProcessType,
    pub first_start: Ticks,
    pub completion: Ticks,
    pub response: Ticks,
    pub waiting: Ticks,
    pub turnaround: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub finish_time: Ticks,
    pub busy_ticks: Ticks,
    /// Percentage of ticks the CPU was busy.
    pub cpu_utilization: f64,
    /// Processes completed per tick.
    pub throughput: f64,
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    pub avg_response: f64,
    pub stats: SchedStats,
    /// Sorted by pid.
    pub processes: Vec<ProcessReport>,
}

impl Report {
    /// Summarize a finished run. Pure: the same jobs and clock always give the
    /// same report.
    pub fn build(
        jobs: &[JobInstance],
        finish_time: Ticks,
        busy_ticks: Ticks,
        stats: SchedStats,
    ) -> Self {
        let mut processes: Vec<ProcessReport> = jobs
            .iter()
            .filter_map(|instance| {
                let row = process_row(instance);
                if row.is_none() {
                    warn!(
                        "{} has not completed, left out of the report",
                        instance.job.pid
                    );
                }
                row
            })
            .collect();
        processes.sort_by(|a, b| a.pid.cmp(&b.pid));

        Self {
            finish_time,
            busy_ticks,
            cpu_utilization: ratio(busy_ticks as f64 * 100.0, finish_time),
            throughput: ratio(jobs.len() as f64, finish_time),
            avg_turnaround: mean(processes.iter().map(|p| p.turnaround as f64)),
            avg_waiting: mean(processes.iter().map(|p| p.waiting as f64)),
            avg_response: mean(processes.iter().map(|p| p.response as f64)),
            stats,
            processes,
        }
    }

    pub fn completed(&self) -> usize {
        self.processes.len()
    }

    pub fn process(&self, pid: &str) -> Option<&ProcessReport> {
        self.processes.iter().find(|p| p.pid == pid)
    }
}

fn process_row(instance: &JobInstance) -> Option<ProcessReport> {
    let job = &instance.job;
    let first_start = instance.start_time?;
    let completion = instance.completion_time?;
    Some(ProcessReport {
        pid: job.pid.clone(),
        arrival: job.arrival,
        burst: job.burst,
        base_priority: job.base_priority,
        ptype: job.ptype,
        first_start,
        completion,
        response: first_start - job.arrival,
        waiting: instance.waiting,
        turnaround: completion - job.arrival,
    })
}

// Zero when no time has passed
fn ratio(numerator: f64, finish_time: Ticks) -> f64 {
    if finish_time == 0 {
        0.0
    } else {
        numerator / finish_time as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let m: Mean = values.collect();
    if m.is_empty() { 0.0 } else { m.estimate() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::job::Job;

    fn finished(job: Job, start: Ticks, completion: Ticks, waiting: Ticks) -> JobInstance {
        JobInstance {
            job,
            task: Some(0),
            start_time: Some(start),
            completion_time: Some(completion),
            waiting,
        }
    }

    #[test]
    fn test_empty_run_reports_zeros() {
        let report = Report::build(&[], 0, 0, SchedStats::default());
        assert_eq!(report.finish_time, 0);
        assert_eq!(report.cpu_utilization, 0.0);
        assert_eq!(report.throughput, 0.0);
        assert_eq!(report.avg_turnaround, 0.0);
        assert_eq!(report.avg_waiting, 0.0);
        assert_eq!(report.avg_response, 0.0);
        assert!(report.processes.is_empty());
    }

    #[test]
    fn test_metrics_and_pid_order() {
        let jobs = vec![
            finished(Job::new("P2", 2, 1, 1, ProcessType::Batch), 4, 5, 2),
            finished(Job::new("P1", 0, 4, 1, ProcessType::Rt), 0, 4, 0),
        ];
        let report = Report::build(&jobs, 8, 5, SchedStats::default());

        let pids: Vec<_> = report.processes.iter().map(|p| p.pid.as_str()).collect();
        assert_eq!(pids, vec!["P1", "P2"]);

        let p2 = report.process("P2").unwrap();
        assert_eq!(p2.response, 2);
        assert_eq!(p2.turnaround, 3);
        assert_eq!(p2.waiting, 2);

        assert_eq!(report.cpu_utilization, 62.5);
        assert_eq!(report.throughput, 0.25);
        assert_eq!(report.avg_turnaround, 3.5);
        assert_eq!(report.avg_waiting, 1.0);
        assert_eq!(report.avg_response, 1.0);
    }

    #[test]
    fn test_build_is_idempotent() {
        let job = Job::new("A", 1, 3, 0, ProcessType::Interactive);
        let jobs = vec![finished(job, 1, 4, 0)];
        let first = Report::build(&jobs, 4, 3, SchedStats::default());
        let second = Report::build(&jobs, 4, 3, SchedStats::default());
        assert_eq!(first, second);
        assert_eq!(jobs[0].waiting, 0);
    }

    #[test]
    fn test_unfinished_jobs_left_out() {
        let jobs = vec![JobInstance::new(Job::new("A", 0, 3, 0, ProcessType::Batch))];
        let report = Report::build(&jobs, 2, 2, SchedStats::default());
        assert_eq!(report.completed(), 0);
        assert_eq!(report.throughput, 0.5);
    }
}
