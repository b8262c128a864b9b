//! Mood and animation hints inferred from response text

/// Presentation hint attached to every response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodHint {
    pub mood: &'static str,
    pub animation: &'static str,
}

impl MoodHint {
    pub const DEFAULT: MoodHint = MoodHint {
        mood: "cheerful",
        animation: "bounce",
    };
}

const RULES: &[(&[&str], MoodHint)] = &[
    (
        &["amazing", "incredible", "fantastic"],
        MoodHint {
            mood: "excited",
            animation: "celebration_bounce",
        },
    ),
    (
        &["gentle", "soft", "calm"],
        MoodHint {
            mood: "gentle",
            animation: "gentle_sway",
        },
    ),
    (
        &["celebrate", "party", "woohoo"],
        MoodHint {
            mood: "celebratory",
            animation: "confetti_explosion",
        },
    ),
];

/// First matching keyword group wins; matching is case-insensitive.
pub fn infer_mood(text: &str) -> MoodHint {
    let lower = text.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, hint)| *hint)
        .unwrap_or(MoodHint::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_groups() {
        assert_eq!(infer_mood("That is AMAZING work").mood, "excited");
        assert_eq!(infer_mood("Take a calm breath").animation, "gentle_sway");
        assert_eq!(infer_mood("Time to celebrate!").mood, "celebratory");
    }

    #[test]
    fn test_default_when_nothing_matches() {
        assert_eq!(infer_mood("New task added."), MoodHint::DEFAULT);
        assert_eq!(infer_mood(""), MoodHint::DEFAULT);
    }

    #[test]
    fn test_first_group_wins() {
        assert_eq!(infer_mood("amazing party").mood, "excited");
    }
}
