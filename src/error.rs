//! Error taxonomy for template loading, draft parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the library.
///
/// `UnknownTemplate`, `UnresolvedReference` and `MalformedDraft` abort the
/// current command. `MalformedFinding` never reaches the end user: the
/// validator logs it and drops the offending finding.
#[derive(Debug, Error)]
pub enum GidError {
    #[error("unknown template '{id}' (expected one of: gid, gid-adversarial, project-snapshot)")]
    UnknownTemplate { id: String },

    #[error("rule '{rule}' references section '{section}' which is not in the {template} schema")]
    UnresolvedReference {
        template: String,
        rule: String,
        section: String,
    },

    #[error("malformed draft {path}: {reason}")]
    MalformedDraft { path: PathBuf, reason: String },

    #[error("rule '{rule}' produced a malformed finding: {reason}")]
    MalformedFinding { rule: String, reason: String },

    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GidError {
    /// Process exit code for errors that abort a command.
    ///
    /// Exit code 1 is reserved for a completed validation that failed, and
    /// for a map input that is not a directory.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotADirectory { .. } => 1,
            _ => 2,
        }
    }

    /// Whether this error is a configuration bug rather than bad user input.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnresolvedReference { .. })
    }
}

pub type Result<T> = std::result::Result<T, GidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_template_message_lists_ids() {
        let err = GidError::UnknownTemplate {
            id: "gdd".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'gdd'"));
        assert!(msg.contains("project-snapshot"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            GidError::UnknownTemplate {
                id: "x".to_string()
            }
            .exit_code(),
            2
        );
        assert_eq!(
            GidError::MalformedDraft {
                path: PathBuf::from("d.md"),
                reason: "bad".to_string()
            }
            .exit_code(),
            2
        );
        assert_eq!(
            GidError::NotADirectory {
                path: PathBuf::from("Assets")
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_only_unresolved_reference_is_configuration() {
        let unresolved = GidError::UnresolvedReference {
            template: "GID".to_string(),
            rule: "r".to_string(),
            section: "Nope".to_string(),
        };
        assert!(unresolved.is_configuration());
        assert!(
            !GidError::UnknownTemplate {
                id: "x".to_string()
            }
            .is_configuration()
        );
    }
}
