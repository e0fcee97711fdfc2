//! Internal helpers for input normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every write path enforces the same rules.

use crate::{EngineError, ResultEngine};

/// Trim a required text field and reject it when empty.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank values become `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Two participant ids that must differ (creditor/debtor, sender/receiver).
pub(crate) fn distinct_parties(
    a: &str,
    b: &str,
    labels: (&str, &str),
) -> ResultEngine<(String, String)> {
    let a = normalize_required_text(a, labels.0)?;
    let b = normalize_required_text(b, labels.1)?;
    if a == b {
        return Err(EngineError::Validation(format!(
            "{} and {} must be different people",
            labels.0, labels.1
        )));
    }
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(normalize_required_text("  Rent ", "description").unwrap(), "Rent");
        assert_eq!(
            normalize_required_text("   ", "description"),
            Err(EngineError::Validation(
                "description must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn optional_text_drops_blanks() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" Joint ")),
            Some("Joint".to_string())
        );
    }

    #[test]
    fn parties_must_differ() {
        assert!(distinct_parties("Claire", "Claire", ("paid_by", "owed_by")).is_err());
        assert!(distinct_parties("Claire", " ", ("paid_by", "owed_by")).is_err());
        assert_eq!(
            distinct_parties("Claire", "Stéphane", ("from", "to")).unwrap(),
            ("Claire".to_string(), "Stéphane".to_string())
        );
    }
}
