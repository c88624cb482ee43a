use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

// Index into Task Vec
pub type TaskId = usize;
pub type Ticks = u64;

/// Ready-queue tier. Lower tiers are always served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Level {
    /// Q0, preemptive priority
    Priority = 0,
    /// Q1, round robin
    RoundRobin = 1,
    /// Q2, first come first served
    Fcfs = 2,
}

impl Level {
    /// Service order.
    pub const ALL: [Level; 3] = [Level::Priority, Level::RoundRobin, Level::Fcfs];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Tier an aged task moves up into. The top tier never ages.
    pub fn promoted(self) -> Option<Level> {
        match self {
            Level::Priority => None,
            Level::RoundRobin => Some(Level::Priority),
            Level::Fcfs => Some(Level::RoundRobin),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Runnable,
    Running,
    Completed,
}

#[derive(Debug)]
pub struct Task {
    pub id: TaskId,
    pub pid: String,
    pub arrival: Ticks,
    pub base_priority: i32,
    pub state: TaskState,
    pub level: Level,
    pub required_service: Ticks,
    pub remaining: Ticks,
    pub first_start: Option<Ticks>,
    pub completion_time: Option<Ticks>,
    // Ticks spent queued while not running
    pub waiting: Ticks,
    pub last_enqueued: Ticks,
}

/// Q0 ordering key, `(base_priority, arrival, pid)` ascending. Pids are
/// unique, so the order is total and ties never depend on heap layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrioKey {
    pub base_priority: i32,
    pub arrival: Ticks,
    pub pid: String,
}

impl PrioKey {
    pub fn of(task: &Task) -> Self {
        Self {
            base_priority: task.base_priority,
            arrival: task.arrival,
            pid: task.pid.clone(),
        }
    }
}

// KeyedPriorityQueue is a max-heap, so the smallest key has to compare greatest
impl Ord for PrioKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.base_priority, other.arrival, &other.pid).cmp(&(
            self.base_priority,
            self.arrival,
            &self.pid,
        ))
    }
}

impl PartialOrd for PrioKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
pub enum Dsq {
    Fifo {
        tasks: VecDeque<TaskId>,
    },
    Priq {
        tasks: KeyedPriorityQueue<TaskId, PrioKey>,
    },
}

impl Dsq {
    pub fn new_fifo() -> Self {
        Self::Fifo {
            tasks: VecDeque::new(),
        }
    }

    pub fn new_priq() -> Self {
        Self::Priq {
            tasks: KeyedPriorityQueue::new(),
        }
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        match self {
            Self::Fifo { tasks } => tasks.contains(&task_id),
            Self::Priq { tasks } => tasks.get_priority(&task_id).is_some(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo { tasks } => tasks.len(),
            Self::Priq { tasks } => tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next task this queue would hand out, without removing it.
    pub fn peek(&self) -> Option<TaskId> {
        match self {
            Self::Fifo { tasks } => tasks.front().copied(),
            Self::Priq { tasks } => tasks.peek().map(|t| *t.0),
        }
    }

    fn pop(&mut self) -> Option<TaskId> {
        match self {
            Self::Fifo { tasks } => tasks.pop_front(),
            Self::Priq { tasks } => tasks.pop().map(|t| t.0),
        }
    }

    /// Members in the order they would be served.
    pub fn ids(&self) -> Vec<TaskId> {
        match self {
            Self::Fifo { tasks } => tasks.iter().copied().collect(),
            Self::Priq { tasks } => {
                let mut entries: Vec<_> = tasks.iter().collect();
                entries.sort_by(|a, b| b.1.cmp(a.1));
                entries.into_iter().map(|t| *t.0).collect()
            }
        }
    }
}

/// A task holding the CPU and what is left of its time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Running {
    pub task: TaskId,
    // None runs until completion or preemption
    pub slice_left: Option<Ticks>,
}

/// Everything a run mutates: clock, tasks, ready queues and the CPU slot.
#[derive(Debug)]
pub struct SchedState {
    pub now: Ticks,
    pub tasks: Vec<Task>,
    pub dsqs: [Dsq; 3],
    pub task_to_dsq: FxHashMap<TaskId, Level>,
    pub running: Option<Running>,
    pub busy_ticks: Ticks,
    pub completed: usize,
}

impl Default for SchedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedState {
    pub fn new() -> Self {
        Self {
            now: 0,
            tasks: Vec::new(),
            dsqs: [Dsq::new_priq(), Dsq::new_fifo(), Dsq::new_fifo()],
            task_to_dsq: FxHashMap::default(),
            running: None,
            busy_ticks: 0,
            completed: 0,
        }
    }

    pub fn create_task(
        &mut self,
        pid: &str,
        arrival: Ticks,
        required_service: Ticks,
        base_priority: i32,
        level: Level,
    ) -> TaskId {
        let id = self.tasks.len();
        self.tasks.push(Task {
            id,
            pid: pid.to_owned(),
            arrival,
            base_priority,
            state: TaskState::Runnable,
            level,
            required_service,
            remaining: required_service,
            first_start: None,
            completion_time: None,
            waiting: 0,
            last_enqueued: self.now,
        });
        id
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Task {
        &mut self.tasks[task_id]
    }

    pub fn dsq(&self, level: Level) -> &Dsq {
        &self.dsqs[level.index()]
    }

    fn dsq_push(&mut self, task_id: TaskId, level: Level, at_front: bool) {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Task {task_id} already present in some DSQ"
        );
        debug_assert!(
            self.running.map(|r| r.task) != Some(task_id),
            "Task {task_id} must leave the CPU before it is enqueued"
        );

        let now = self.now;
        let task = &mut self.tasks[task_id];
        debug_assert_ne!(
            task.state,
            TaskState::Completed,
            "Completed task {task_id} cannot be enqueued"
        );
        task.state = TaskState::Runnable;
        task.level = level;
        task.last_enqueued = now;

        match &mut self.dsqs[level.index()] {
            Dsq::Fifo { tasks } if at_front => tasks.push_front(task_id),
            Dsq::Fifo { tasks } => tasks.push_back(task_id),
            Dsq::Priq { tasks } => {
                tasks.push(task_id, PrioKey::of(&self.tasks[task_id]));
            }
        }

        self.task_to_dsq.insert(task_id, level);
    }

    /// Append to the back of `level`, stamping the enqueue time.
    pub fn enqueue(&mut self, task_id: TaskId, level: Level) {
        self.dsq_push(task_id, level, false);
    }

    /// Put a task back at the head of its own tier.
    pub fn requeue_front(&mut self, task_id: TaskId) {
        let level = self.tasks[task_id].level;
        self.dsq_push(task_id, level, true);
    }

    pub fn dsq_pop(&mut self, level: Level) -> Option<TaskId> {
        let task = self.dsqs[level.index()].pop()?;
        let removed = self.task_to_dsq.remove(&task);
        debug_assert!(removed.is_some(), "Task {task} missing DSQ membership");
        Some(task)
    }

    pub fn dsq_peek(&self, level: Level) -> Option<TaskId> {
        self.dsq(level).peek()
    }

    /// Remove every member of `level` matching `pred`, returned in service
    /// order. Survivors keep their relative order.
    pub fn dsq_extract(
        &mut self,
        level: Level,
        mut pred: impl FnMut(&Task) -> bool,
    ) -> Vec<TaskId> {
        let tasks = &self.tasks;
        let taken: Vec<TaskId> = match &mut self.dsqs[level.index()] {
            Dsq::Fifo { tasks: queue } => {
                let (taken, kept): (VecDeque<_>, VecDeque<_>) =
                    queue.drain(..).partition(|&id| pred(&tasks[id]));
                *queue = kept;
                taken.into()
            }
            Dsq::Priq { tasks: queue } => {
                let mut taken: Vec<(TaskId, PrioKey)> = queue
                    .iter()
                    .filter(|t| pred(&tasks[*t.0]))
                    .map(|t| (*t.0, t.1.clone()))
                    .collect();
                taken.sort_by(|a, b| b.1.cmp(&a.1));
                for (id, _) in &taken {
                    queue.remove(id);
                }
                taken.into_iter().map(|t| t.0).collect()
            }
        };

        for id in &taken {
            self.task_to_dsq.remove(id);
        }
        taken
    }

    pub fn queued(&self, level: Level) -> Vec<TaskId> {
        self.dsq(level).ids()
    }

    pub fn queued_pids(&self, level: Level) -> Vec<&str> {
        self.queued(level)
            .into_iter()
            .map(|id| self.tasks[id].pid.as_str())
            .collect()
    }

    pub fn cpu_is_idle(&self) -> bool {
        self.running.is_none()
    }

    /// Returns true on the task's first ever dispatch.
    pub fn set_running(&mut self, task_id: TaskId, slice: Option<Ticks>) -> bool {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Running task {task_id} must not be enqueued"
        );
        debug_assert!(self.running.is_none(), "CPU already running a task");

        self.running = Some(Running {
            task: task_id,
            slice_left: slice,
        });

        let now = self.now;
        let task = &mut self.tasks[task_id];
        task.state = TaskState::Running;
        let first = task.first_start.is_none();
        task.first_start.get_or_insert(now);
        first
    }

    pub fn clear_cpu(&mut self) -> Option<Running> {
        self.running.take()
    }

    /// Every queued task waits out the current tick.
    pub fn charge_queued_wait(&mut self) {
        for &id in self.task_to_dsq.keys() {
            self.tasks[id].waiting += 1;
        }
    }

    pub fn mark_completed(&mut self, task_id: TaskId, completion_time: Ticks) {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Completing task {task_id} that is still enqueued"
        );

        let task = &mut self.tasks[task_id];
        debug_assert!(
            task.state == TaskState::Running,
            "Task {task_id} must have been running before marked complete"
        );
        debug_assert_eq!(task.remaining, 0, "Task {task_id} completed with work left");

        task.state = TaskState::Completed;
        task.completion_time = Some(completion_time);
        self.completed += 1;
    }
}
