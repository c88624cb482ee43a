pub mod driver;
pub mod job;
pub mod report;

pub use driver::Sim;
pub use job::{Job, JobInstance, Pid, ProcessType, demo_jobs};
pub use report::{ProcessReport, Report};
