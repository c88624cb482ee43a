pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use event::SchedEvent;
pub use observer::{Observer, SchedStats};
pub use state::{Dsq, Level, PrioKey, Running, SchedState, Task, TaskId, TaskState, Ticks};
