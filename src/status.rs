//! Status and error types shared by all instance operations.

/// Successful outcome of an instance operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Res {
    /// The call was successful and all output values are defined.
    OK,
    /// A non-critical problem was detected but the computation may continue.
    /// The instance logs further information before returning this status.
    Warning,
}

/// Failed outcome of an instance operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The call could not produce a meaningful result, but the instance is in
    /// the same state as before the call. The caller may retry with different
    /// arguments, typically a smaller step size. The engine never retries
    /// internally; this status is purely advisory upward.
    #[error("Discard")]
    Discard,
    /// The call failed and the output values are undefined. Illegal arguments
    /// and calls not allowed in the current state return this status; the
    /// instance must be reset or freed afterwards.
    #[error("Error")]
    Error,
    /// Unrecoverable. After this status the caller must not invoke any further
    /// operation on the instance except dropping it.
    #[error("Fatal")]
    Fatal,
}

/// Full severity-ordered status, used on the logging side channel where
/// success and failure travel together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    OK,
    Warning,
    Discard,
    Error,
    Fatal,
}

impl Status {
    /// Combine two statuses, keeping the most severe. Sub-operation statuses
    /// bubble to the caller this way instead of being masked.
    #[must_use]
    pub fn max(self, other: Status) -> Status {
        std::cmp::Ord::max(self, other)
    }

    /// Split back into the success/failure result form.
    pub fn ok(self) -> Result<Res, ModelError> {
        self.into()
    }
}

impl From<Res> for Status {
    fn from(res: Res) -> Self {
        match res {
            Res::OK => Status::OK,
            Res::Warning => Status::Warning,
        }
    }
}

impl From<ModelError> for Status {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Discard => Status::Discard,
            ModelError::Error => Status::Error,
            ModelError::Fatal => Status::Fatal,
        }
    }
}

impl From<Result<Res, ModelError>> for Status {
    fn from(result: Result<Res, ModelError>) -> Self {
        match result {
            Ok(res) => res.into(),
            Err(err) => err.into(),
        }
    }
}

impl From<Status> for Result<Res, ModelError> {
    fn from(status: Status) -> Self {
        match status {
            Status::OK => Ok(Res::OK),
            Status::Warning => Ok(Res::Warning),
            Status::Discard => Err(ModelError::Discard),
            Status::Error => Err(ModelError::Error),
            Status::Fatal => Err(ModelError::Fatal),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::OK => "OK",
            Status::Warning => "Warning",
            Status::Discard => "Discard",
            Status::Error => "Error",
            Status::Fatal => "Fatal",
        };
        write!(f, "{name}")
    }
}
