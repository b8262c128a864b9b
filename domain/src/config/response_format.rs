//! Response format value object

use serde::{Deserialize, Serialize};

/// Shape of the text a subject expects back from its primary model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Free-form text (default)
    Text,
    /// A single JSON document
    Json,
}

impl ResponseFormat {
    /// Accepted configuration values
    pub const VALID_VALUES: &'static [&'static str] = &["text", "json"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text",
            ResponseFormat::Json => "json",
        }
    }

    /// Whether a model reply satisfies this format
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            ResponseFormat::Text => true,
            ResponseFormat::Json => serde_json::from_str::<serde_json::Value>(text.trim()).is_ok(),
        }
    }
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::str::FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ResponseFormat::Text),
            "json" => Ok(ResponseFormat::Json),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_text() {
        assert_eq!(ResponseFormat::default(), ResponseFormat::Text);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&ResponseFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!("JSON".parse::<ResponseFormat>(), Ok(ResponseFormat::Json));
        assert_eq!("yaml".parse::<ResponseFormat>(), Err("yaml".to_string()));
    }

    #[test]
    fn test_accepts() {
        assert!(ResponseFormat::Text.accepts("anything at all"));
        assert!(ResponseFormat::Json.accepts(" {\"message\": \"hi\"}\n"));
        assert!(!ResponseFormat::Json.accepts("Sure! Here you go: {"));
    }
}
