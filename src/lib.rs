pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use crate::core::{Level, SchedEvent};
pub use error::{ConfigError, InputError, SimError, SimResult};
pub use scheduler::MlfqConfig;
pub use sim::{Job, ProcessType, Report, Sim};
