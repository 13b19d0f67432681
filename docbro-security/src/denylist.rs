//! ABOUTME: Admin-server denylist — operations that are always 403, regardless of auth (spec §4.L)

use docbro_core::error::DocBroError;

const DENIED_OPERATIONS: &[&str] = &["delete_shelf", "uninstall", "reset", "delete_all_projects"];

#[must_use]
pub fn is_denied(operation: &str) -> bool {
    DENIED_OPERATIONS.contains(&operation)
}

/// Returns `Err(ProhibitedOp)` for any denylisted operation.
pub fn enforce_not_denied(operation: &str) -> Result<(), DocBroError> {
    if is_denied(operation) {
        Err(DocBroError::ProhibitedOp { op: operation.to_string() })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denylisted_operations_are_rejected() {
        for op in DENIED_OPERATIONS {
            let err = enforce_not_denied(op).unwrap_err();
            assert_eq!(err.code(), "operation_prohibited");
        }
    }

    #[test]
    fn other_operations_pass_through() {
        assert!(enforce_not_denied("create_shelf").is_ok());
        assert!(enforce_not_denied("fill").is_ok());
    }
}
