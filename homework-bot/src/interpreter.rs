//! Status code to message mapping.

use std::collections::HashMap;

use crate::domain::{HomeworkStatus, TrackedItemRecord};
use crate::error::InterpretationError;

/// Maps raw status codes to verdict text and composes the outgoing message.
///
/// Starts with the documented [`HomeworkStatus`] set; further codes can be
/// registered with [`StatusInterpreter::with_verdict`].
#[derive(Debug, Clone)]
pub struct StatusInterpreter {
    verdicts: HashMap<String, String>,
}

impl Default for StatusInterpreter {
    fn default() -> Self {
        let verdicts = HomeworkStatus::ALL
            .iter()
            .map(|status| (status.to_string(), status.verdict().to_string()))
            .collect();
        Self { verdicts }
    }
}

impl StatusInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the verdict for a status code.
    pub fn with_verdict(mut self, code: impl Into<String>, verdict: impl Into<String>) -> Self {
        self.verdicts.insert(code.into(), verdict.into());
        self
    }

    pub fn verdict(&self, code: &str) -> Option<&str> {
        self.verdicts.get(code).map(String::as_str)
    }

    /// Build the notification text for `record`.
    pub fn interpret(&self, record: &TrackedItemRecord) -> Result<String, InterpretationError> {
        let code = record.status.as_deref().unwrap_or_default();
        let verdict = self
            .verdict(code)
            .ok_or_else(|| InterpretationError::UnknownStatus {
                item: record.homework_name.clone(),
                code: code.to_string(),
            })?;

        Ok(format!(
            "status changed for {}: {}",
            record.homework_name, verdict
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(status: Option<&str>) -> TrackedItemRecord {
        TrackedItemRecord {
            id: Some(1),
            homework_name: "hw1".to_string(),
            status: status.map(str::to_string),
            date_updated: None,
            lesson_name: None,
            reviewer_comment: None,
        }
    }

    #[rstest]
    #[case("approved", "status changed for hw1: Работа проверена: ревьюеру всё понравилось. Ура!")]
    #[case("reviewing", "status changed for hw1: Работа взята на проверку ревьюером.")]
    #[case("rejected", "status changed for hw1: Работа проверена: у ревьюера есть замечания.")]
    fn test_known_statuses(#[case] code: &str, #[case] expected: &str) {
        let interpreter = StatusInterpreter::default();
        assert_eq!(interpreter.interpret(&record(Some(code))).unwrap(), expected);
    }

    #[rstest]
    #[case(Some("unknown"), "unknown")]
    #[case(Some("APPROVED"), "APPROVED")]
    #[case(None, "")]
    fn test_unknown_status(#[case] status: Option<&str>, #[case] code: &str) {
        let interpreter = StatusInterpreter::default();
        assert_eq!(
            interpreter.interpret(&record(status)),
            Err(InterpretationError::UnknownStatus {
                item: "hw1".to_string(),
                code: code.to_string(),
            })
        );
    }

    #[test]
    fn test_extended_verdicts() {
        let interpreter = StatusInterpreter::new().with_verdict("on_hold", "Работа отложена.");
        assert_eq!(
            interpreter.interpret(&record(Some("on_hold"))).unwrap(),
            "status changed for hw1: Работа отложена."
        );
        assert!(interpreter.verdict("approved").is_some());
    }
}
