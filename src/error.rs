use thiserror::Error;

/// Failures surfaced by the atom model.
///
/// None of these are retryable: the model performs no I/O, so callers should
/// validate beforehand or report the error upwards.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AtomError {
    /// A particle type tag that is not proton, neutron or electron.
    #[error("unknown particle type '{0}'")]
    UnknownParticleKind(String),

    /// The particle is not held by the atom or collection it was removed from.
    #[error("particle #{id} is not a member of this atom")]
    NotAMember { id: u64 },

    /// All ten electron shell positions are already occupied.
    #[error("no open electron shell positions")]
    NoOpenShellPosition,

    /// Rejected atom configuration.
    #[error("invalid atom configuration: {0}")]
    InvalidConfig(String),
}

pub type AtomResult<T> = Result<T, AtomError>;
