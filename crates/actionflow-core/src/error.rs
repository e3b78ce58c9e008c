//! Core error types for the Actionflow workflow model.
//!
//! Parse failures never abort: the parser always produces a best-effort
//! `Workflow` and reports problems as a list of `ParseError` values. The
//! `Display` output of each variant is the user-facing error string.

/// A structural problem found while turning YAML text into a `Workflow`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The text is not valid YAML.
    #[error("YAML parse error: {message}")]
    Syntax {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// The document parsed, but its root is not a mapping.
    #[error("Invalid workflow: root must be a mapping")]
    InvalidRoot,

    /// The root has no `jobs` mapping (absent, null, or another type).
    #[error("Workflow must have a \"jobs\" mapping")]
    MissingJobs,

    /// A `jobs` entry is not a mapping; the job is left out of the model.
    #[error("Job \"{job_id}\" must be a mapping")]
    InvalidJob { job_id: String },
}

impl ParseError {
    /// Build a syntax error from the underlying YAML library error.
    pub fn from_yaml(err: &serde_yaml::Error) -> Self {
        let location = err.location();
        ParseError::Syntax {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

/// Failure to render a `Workflow` back into YAML text.
#[derive(Debug, thiserror::Error)]
#[error("Failed to serialize workflow: {0}")]
pub struct SerializeError(#[from] serde_yaml::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_mentions_parse() {
        let err = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let parse_err = ParseError::from_yaml(&err);
        assert!(parse_err.to_string().contains("parse"));
        if let ParseError::Syntax { line, .. } = parse_err {
            assert!(line.is_some());
        } else {
            panic!("expected a syntax error");
        }
    }

    #[test]
    fn test_missing_jobs_mentions_jobs() {
        assert!(ParseError::MissingJobs.to_string().contains("jobs"));
    }

    #[test]
    fn test_invalid_job_names_job() {
        let err = ParseError::InvalidJob {
            job_id: "build".to_string(),
        };
        assert_eq!(err.to_string(), "Job \"build\" must be a mapping");
    }
}
