use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed difficulty scale for generated interview prompts.
/// Parsed case-insensitively at the API boundary; stored as a Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "difficulty", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromptRow {
    pub prompt_id: Uuid,
    pub tech_stack: String,
    pub difficulty: Difficulty,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(Difficulty::parse("easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("MEDIUM"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::parse("Hard"), Some(Difficulty::Hard));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Difficulty::parse("expert"), None);
        assert_eq!(Difficulty::parse(""), None);
    }
}
