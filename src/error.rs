use thiserror::Error;

/// Simulation operation result
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while constructing a simulation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Invalid input: {0}")]
    InvalidInput(InputError),

    #[error("Invalid config: {0}")]
    InvalidConfig(ConfigError),
}

/// Rejected process descriptors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("duplicate pid {0:?}")]
    DuplicatePid(String),

    #[error("process {0:?} has a zero burst and would never complete")]
    ZeroBurst(String),

    #[error("process with an empty pid")]
    EmptyPid,
}

/// Rejected scheduler parameters
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rr_quantum must be positive")]
    ZeroQuantum,

    #[error("aging_threshold must be positive")]
    ZeroAgingThreshold,
}

impl From<InputError> for SimError {
    fn from(err: InputError) -> Self {
        SimError::InvalidInput(err)
    }
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        SimError::InvalidConfig(err)
    }
}
