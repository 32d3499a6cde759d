use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The broad category an `MlErr` belongs to.
///
/// None of them are retryable, every error is deterministic given the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operation was called in a way it can never succeed.
    InvalidUsage,
    /// The operation needs a capability the model was not built with.
    ConfigurationMismatch,
    /// Some buffer or vector has the wrong length.
    DimensionMismatch,
    /// An argument is outside of its domain.
    InvalidArgument,
}

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidBatchSize {
        got: usize,
    },
    MissingState,
    NotEvaluated,
    ForeignState {
        owner: usize,
        model: usize,
    },
    GradientDisabled,
    InvalidTopology(&'static str),
    InvalidWeight {
        weight: f64,
    },
    EmptyEnsemble,
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl MlErr {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MlErr::MissingState
            | MlErr::NotEvaluated
            | MlErr::ForeignState { .. }
            | MlErr::InvalidBatchSize { .. } => ErrorKind::InvalidUsage,
            MlErr::GradientDisabled => ErrorKind::ConfigurationMismatch,
            MlErr::SizeMismatch { .. } => ErrorKind::DimensionMismatch,
            MlErr::InvalidTopology(_)
            | MlErr::InvalidWeight { .. }
            | MlErr::EmptyEnsemble
            | MlErr::IndexOutOfBounds { .. } => ErrorKind::InvalidArgument,
        }
    }
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => format!("There's a size mismatch in {what}, got {got} and expected {expected}"),
            MlErr::InvalidBatchSize { got } => {
                format!("Online evaluation only accepts batches of size 1, got {got}")
            }
            MlErr::MissingState => {
                "An online recurrent network can not be evaluated without a sequence state"
                    .to_string()
            }
            MlErr::NotEvaluated => {
                "The parameter derivative was requested before evaluating any timestep".to_string()
            }
            MlErr::ForeignState { owner, model } => format!(
                "The sequence state was created by model #{owner} but was given to model #{model}"
            ),
            MlErr::GradientDisabled => {
                "The parameter derivative was requested but gradient tracking was disabled on construction"
                    .to_string()
            }
            MlErr::InvalidTopology(msg) => format!("Invalid network topology: {msg}"),
            MlErr::InvalidWeight { weight } => {
                format!("Ensemble weights must be positive, got {weight}")
            }
            MlErr::EmptyEnsemble => "Tried to evaluate an ensemble without models".to_string(),
            MlErr::IndexOutOfBounds { what, index, len } => {
                format!("The index {index} is out of bounds for {what} of length {len}")
            }
        };

        write!(f, "{s}")
    }
}

impl Error for MlErr {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(MlErr::MissingState.kind(), ErrorKind::InvalidUsage);
        assert_eq!(MlErr::NotEvaluated.kind(), ErrorKind::InvalidUsage);
        assert_eq!(
            MlErr::InvalidBatchSize { got: 2 }.kind(),
            ErrorKind::InvalidUsage
        );
        assert_eq!(
            MlErr::GradientDisabled.kind(),
            ErrorKind::ConfigurationMismatch
        );
        assert_eq!(
            MlErr::SizeMismatch {
                what: "input",
                got: 1,
                expected: 2
            }
            .kind(),
            ErrorKind::DimensionMismatch
        );
        assert_eq!(MlErr::EmptyEnsemble.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn display_mentions_the_sizes() {
        let err = MlErr::SizeMismatch {
            what: "coefficients",
            got: 3,
            expected: 1,
        };

        let msg = err.to_string();
        assert!(msg.contains("coefficients"));
        assert!(msg.contains('3'));
    }
}
