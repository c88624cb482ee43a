use super::job::{Job, JobInstance};
use super::report::Report;
use crate::{
    core::{SchedCore, SchedEvent, TaskId, Ticks},
    error::{InputError, SimResult},
    scheduler::MlfqConfig,
};
use log::info;
use rustc_hash::{FxHashMap, FxHashSet};

pub struct Sim {
    pub core: SchedCore,
    pub jobs: Vec<JobInstance>,
    job_cursor: usize,
    // TaskId --> job[index] map; used to propagate task progress to Job object
    tasks_to_jobs: FxHashMap<TaskId, usize>,
}

impl Sim {
    pub fn new(mut jobs: Vec<Job>, config: MlfqConfig) -> SimResult<Self> {
        config.validate()?;
        validate_jobs(&jobs)?;

        jobs.sort_by(|a, b| {
            a.arrival
                .cmp(&b.arrival)
                .then_with(|| a.pid.cmp(&b.pid))
        });
        let jobs = jobs.into_iter().map(JobInstance::new).collect();

        Ok(Self {
            core: SchedCore::new(config),
            jobs,
            job_cursor: 0,
            tasks_to_jobs: FxHashMap::default(),
        })
    }

    /// Advance the simulation by one tick and return what happened in it.
    pub fn step(&mut self) -> Vec<SchedEvent> {
        let mut events = Vec::new();
        self.handle_arrivals(&mut events);
        self.core.tick(&mut events);
        self.propagate(&events);
        events
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SchedEvent>) {
        let now = self.core.now();
        // Arrivals are contiguous, since jobs are sorted
        while let Some(instance) = self.jobs.get(self.job_cursor) {
            if instance.job.arrival != now {
                break;
            }

            let job = &instance.job;
            let level = job.ptype.initial_level();
            let task_id = self.core.ctx.create_task(
                &job.pid,
                job.arrival,
                job.burst,
                job.base_priority,
                level,
            );
            self.tasks_to_jobs.insert(task_id, self.job_cursor);
            self.jobs[self.job_cursor].task = Some(task_id);
            self.core.admit(task_id, level, events);

            self.job_cursor += 1;
        }
    }

    fn propagate(&mut self, events: &[SchedEvent]) {
        for event in events {
            match *event {
                SchedEvent::Dispatched {
                    task, first: true, ..
                } => {
                    if let Some(&idx) = self.tasks_to_jobs.get(&task) {
                        self.jobs[idx].start_time = self.core.ctx.task(task).first_start;
                    }
                }
                SchedEvent::Completed { task, at } => {
                    if let Some(&idx) = self.tasks_to_jobs.get(&task) {
                        self.jobs[idx].completion_time = Some(at);
                        self.jobs[idx].waiting = self.core.ctx.task(task).waiting;
                    }
                }
                _ => {}
            }
        }
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.ctx.completed == self.jobs.len()
    }

    pub fn run(&mut self) -> Report {
        self.run_with(|_, _| {})
    }

    /// Run to completion, handing each tick's events to `on_step`.
    pub fn run_with(&mut self, mut on_step: impl FnMut(Ticks, &[SchedEvent])) -> Report {
        let config = *self.core.scheduler.config();
        info!(
            "Simulating {} processes, rr_quantum={} aging_threshold={}",
            self.jobs.len(),
            config.rr_quantum,
            config.aging_threshold
        );

        while !self.all_jobs_completed() {
            let now = self.core.now();
            let events = self.step();
            on_step(now, &events);
        }

        let report = self.report();
        info!(
            "All {} processes completed at t={}",
            report.completed(),
            report.finish_time
        );
        report
    }

    pub fn report(&self) -> Report {
        Report::build(
            &self.jobs,
            self.core.now(),
            self.core.ctx.busy_ticks,
            self.core.stats(),
        )
    }

    pub fn jobs_map<'a, T>(
        &'a self,
        f: impl Fn(&JobInstance) -> T + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        self.jobs.iter().map(f)
    }
}

fn validate_jobs(jobs: &[Job]) -> SimResult<()> {
    let mut seen = FxHashSet::default();
    for job in jobs {
        if job.pid.is_empty() {
            return Err(InputError::EmptyPid.into());
        }
        if job.burst == 0 {
            return Err(InputError::ZeroBurst(job.pid.clone()).into());
        }
        if !seen.insert(job.pid.as_str()) {
            return Err(InputError::DuplicatePid(job.pid.clone()).into());
        }
    }
    Ok(())
}
