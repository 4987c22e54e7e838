//! Internal helpers for name validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! trimming rules so registry, tally and ledger keys agree on what a name is.

use crate::{EngineError, ResultEngine};

/// Trim `value` and reject it when nothing is left.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::EmptyName(label.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Collapse every whitespace run into a single `_`, dropping leading and
/// trailing whitespace.
pub(crate) fn underscore_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(
            normalize_required_name("  Autos ", "category").unwrap(),
            "Autos"
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            normalize_required_name(" \t ", "route"),
            Err(EngineError::EmptyName("route".to_string()))
        );
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(underscore_whitespace(" north   loop\t2 "), "north_loop_2");
        assert_eq!(underscore_whitespace("ana"), "ana");
    }
}
