#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, time::Duration};

use rhai::EvalAltResult;
use thiserror::Error;

/// Every way a grading run can go wrong.
///
/// The recoverable/fatal boundary sits at the question level: `Eval` and
/// `Timeout` are caught by the ledger and converted into zero credit for the
/// question that raised them, while `NotFound`, `Format`, and `Io` surface
/// during discovery or artifact writing and abort the run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A test, solution, or CONFIG file is missing.
    #[error("file not found: {path}")]
    NotFound {
        /// The path that did not exist.
        path: PathBuf,
    },

    /// A test file contains a line the grammar does not accept, or a
    /// multi-line block that is never closed.
    #[error("invalid format in test file {path} at line {line}: {reason}")]
    Format {
        /// Source file identifier, as stored in the record's `path` field.
        path:   String,
        /// 1-based line number of the offending line.
        line:   usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Student-supplied code failed while being evaluated.
    #[error("evaluation error ({kind}): {message}")]
    Eval {
        /// Coarse classification of the failure, used for hint lookup.
        kind:    String,
        /// The engine's own description of the failure.
        message: String,
    },

    /// A question exceeded its wall-clock grading budget.
    #[error("question terminated: exceeded the {}s grading deadline", .0.as_secs())]
    Timeout(Duration),

    /// Reading or writing a file failed for reasons other than absence.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Wraps an engine failure, classifying it for hint lookup.
    pub fn from_rhai(err: Box<EvalAltResult>) -> Self {
        HarnessError::Eval {
            kind:    classify(&err).to_string(),
            message: err.to_string(),
        }
    }

    /// Returns the hint-lookup kind for evaluation errors, `None` otherwise.
    pub fn eval_kind(&self) -> Option<&str> {
        match self {
            HarnessError::Eval { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Maps an engine error onto the small set of kinds the hint map is keyed by.
fn classify(err: &EvalAltResult) -> &'static str {
    match err {
        EvalAltResult::ErrorVariableNotFound(..) => "VariableNotFound",
        EvalAltResult::ErrorFunctionNotFound(..) => "FunctionNotFound",
        EvalAltResult::ErrorArithmetic(..) => "Arithmetic",
        EvalAltResult::ErrorArrayBounds(..) => "IndexOutOfBounds",
        EvalAltResult::ErrorInModule(_, inner, _) => classify(inner),
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => classify(inner),
        _ => "Runtime",
    }
}
