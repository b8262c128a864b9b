//! Subject value object: the fixed set of use-case categories

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named use-case category with its own model configuration and prompts.
///
/// The set is closed: configuration naming anything else fails to load,
/// and requests for anything else are rejected as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    TaskCreation,
    TaskCompletion,
    Motivation,
    Celebration,
    Encouragement,
    ProductivityTips,
    GoalSetting,
    TimeManagement,
    HabitFormation,
    StressManagement,
    TeamCollaboration,
    ProjectPlanning,
}

impl Subject {
    /// Every known subject, in declaration order.
    pub const ALL: [Subject; 12] = [
        Subject::TaskCreation,
        Subject::TaskCompletion,
        Subject::Motivation,
        Subject::Celebration,
        Subject::Encouragement,
        Subject::ProductivityTips,
        Subject::GoalSetting,
        Subject::TimeManagement,
        Subject::HabitFormation,
        Subject::StressManagement,
        Subject::TeamCollaboration,
        Subject::ProjectPlanning,
    ];

    /// Get the wire name for this subject
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::TaskCreation => "task_creation",
            Subject::TaskCompletion => "task_completion",
            Subject::Motivation => "motivation",
            Subject::Celebration => "celebration",
            Subject::Encouragement => "encouragement",
            Subject::ProductivityTips => "productivity_tips",
            Subject::GoalSetting => "goal_setting",
            Subject::TimeManagement => "time_management",
            Subject::HabitFormation => "habit_formation",
            Subject::StressManagement => "stress_management",
            Subject::TeamCollaboration => "team_collaboration",
            Subject::ProjectPlanning => "project_planning",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known subject.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subject: {0}")]
pub struct ParseSubjectError(pub String);

impl std::str::FromStr for Subject {
    type Err = ParseSubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .iter()
            .copied()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| ParseSubjectError(s.to_string()))
    }
}

impl Serialize for Subject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Subject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_roundtrip() {
        for subject in Subject::ALL {
            let parsed: Subject = subject.to_string().parse().unwrap();
            assert_eq!(subject, parsed);
        }
    }

    #[test]
    fn test_unknown_subject_rejected() {
        let err = "birthday_party".parse::<Subject>().unwrap_err();
        assert_eq!(err.to_string(), "unknown subject: birthday_party");
    }

    #[test]
    fn test_serde_uses_snake_case_names() {
        let json = serde_json::to_string(&Subject::ProductivityTips).unwrap();
        assert_eq!(json, "\"productivity_tips\"");
        let subject: Subject = serde_json::from_str("\"team_collaboration\"").unwrap();
        assert_eq!(subject, Subject::TeamCollaboration);
    }
}
