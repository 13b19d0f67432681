//! ABOUTME: Declarative per-step field definitions and validation rules (spec §4.J)

use docbro_core::error::DocBroError;

use crate::session::WizardKind;

#[derive(Debug, Clone, Copy)]
pub enum ValidationRule {
    NonEmptyString,
    PortRange(u16, u16),
    Url,
    OneOf(&'static [&'static str]),
}

impl ValidationRule {
    /// Returns `Err(WizardInvalid)` describing why `value` fails the rule.
    pub fn validate(self, field: &str, value: &serde_json::Value) -> Result<(), DocBroError> {
        let fail = |reason: &str| {
            Err(DocBroError::WizardInvalid { message: format!("'{field}': {reason}") })
        };
        match self {
            Self::NonEmptyString => match value.as_str() {
                Some(s) if !s.trim().is_empty() => Ok(()),
                _ => fail("expected a non-empty string"),
            },
            Self::PortRange(min, max) => match value.as_u64().and_then(|n| u16::try_from(n).ok()) {
                Some(port) if port >= min && port <= max => Ok(()),
                _ => fail(&format!("expected a port between {min} and {max}")),
            },
            Self::Url => match value.as_str().and_then(|s| url::Url::parse(s).ok()) {
                Some(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
                _ => fail("expected an http(s) URL"),
            },
            Self::OneOf(choices) => match value.as_str() {
                Some(s) if choices.contains(&s) => Ok(()),
                _ => fail(&format!("expected one of {choices:?}")),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    pub field: &'static str,
    pub rule: ValidationRule,
}

/// Declarative step lists per wizard kind. Order is the step order; the
/// field name is the `collected` key the submitted value is stored under.
#[must_use]
pub fn steps_for(kind: WizardKind) -> &'static [StepDef] {
    match kind {
        WizardKind::Shelf => &[
            StepDef { field: "default_box_type", rule: ValidationRule::OneOf(&["drag", "rag", "bag"]) },
            StepDef { field: "description", rule: ValidationRule::NonEmptyString },
        ],
        WizardKind::Box => &[
            StepDef { field: "box_type", rule: ValidationRule::OneOf(&["drag", "rag", "bag"]) },
            StepDef { field: "shelf", rule: ValidationRule::NonEmptyString },
            StepDef { field: "source", rule: ValidationRule::NonEmptyString },
        ],
        WizardKind::Mcp => &[
            StepDef { field: "read_only_port", rule: ValidationRule::PortRange(1024, 65535) },
            StepDef { field: "admin_port", rule: ValidationRule::PortRange(1024, 65535) },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_range_rejects_out_of_range() {
        let rule = ValidationRule::PortRange(1024, 65535);
        assert!(rule.validate("port", &serde_json::json!(80)).is_err());
        assert!(rule.validate("port", &serde_json::json!(9383)).is_ok());
    }

    #[test]
    fn one_of_rejects_unknown_choice() {
        let rule = ValidationRule::OneOf(&["drag", "rag", "bag"]);
        assert!(rule.validate("box_type", &serde_json::json!("crate")).is_err());
        assert!(rule.validate("box_type", &serde_json::json!("rag")).is_ok());
    }

    #[test]
    fn url_rule_requires_http_scheme() {
        let rule = ValidationRule::Url;
        assert!(rule.validate("source", &serde_json::json!("ftp://example.com")).is_err());
        assert!(rule.validate("source", &serde_json::json!("https://example.com")).is_ok());
    }
}
