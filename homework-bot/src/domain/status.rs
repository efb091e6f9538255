//! Known homework review statuses.

use serde::{Deserialize, Serialize};

/// Closed set of statuses the review service documents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Canonical verdict text for this status.
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Option<HomeworkStatus> {
        code.parse().ok()
    }

    #[test]
    fn test_parse_known_codes() {
        assert_eq!(parse("approved"), Some(HomeworkStatus::Approved));
        assert_eq!(parse("reviewing"), Some(HomeworkStatus::Reviewing));
        assert_eq!(parse("rejected"), Some(HomeworkStatus::Rejected));
    }

    #[test]
    fn test_parse_unknown_codes() {
        assert_eq!(parse("Approved"), None);
        assert_eq!(parse("pending"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_display_matches_wire_code() {
        for status in HomeworkStatus::ALL {
            assert_eq!(parse(&status.to_string()), Some(status));
        }
    }
}
