//! Static fallback response pool

use serde::{Deserialize, Serialize};

/// A canned response served when the primary model is unavailable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackResponse {
    pub text: String,
    /// Relative selection weight (>= 0, need not sum to 1)
    pub weight: f64,
    pub context_type: String,
    pub mood: String,
    pub animation: String,
}

impl FallbackResponse {
    pub const DEFAULT_CONTEXT_TYPE: &'static str = "general";
    pub const DEFAULT_MOOD: &'static str = "cheerful";
    pub const DEFAULT_ANIMATION: &'static str = "bounce";

    pub fn new(text: impl Into<String>, weight: f64) -> Self {
        Self {
            text: text.into(),
            weight,
            context_type: Self::DEFAULT_CONTEXT_TYPE.to_string(),
            mood: Self::DEFAULT_MOOD.to_string(),
            animation: Self::DEFAULT_ANIMATION.to_string(),
        }
    }

    pub fn with_context_type(mut self, context_type: impl Into<String>) -> Self {
        self.context_type = context_type.into();
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = mood.into();
        self
    }

    pub fn with_animation(mut self, animation: impl Into<String>) -> Self {
        self.animation = animation.into();
        self
    }
}

/// Why a set of fallback responses cannot form a pool
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FallbackPoolError {
    #[error("fallback pool is empty")]
    Empty,

    #[error("fallback response #{index} has invalid weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("fallback pool has no positive weight")]
    ZeroTotalWeight,
}

/// Ordered, non-empty set of fallback responses with a positive total weight.
///
/// Immutable once built; the constructor is the only place the invariants
/// are checked, so selection never has to handle an empty pool.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPool {
    responses: Vec<FallbackResponse>,
}

impl FallbackPool {
    pub fn new(responses: Vec<FallbackResponse>) -> Result<Self, FallbackPoolError> {
        if responses.is_empty() {
            return Err(FallbackPoolError::Empty);
        }
        for (index, response) in responses.iter().enumerate() {
            if !response.weight.is_finite() || response.weight < 0.0 {
                return Err(FallbackPoolError::InvalidWeight {
                    index,
                    weight: response.weight,
                });
            }
        }
        let total: f64 = responses.iter().map(|r| r.weight).sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(FallbackPoolError::ZeroTotalWeight);
        }
        Ok(Self { responses })
    }

    pub fn responses(&self) -> &[FallbackResponse] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.responses.iter().map(|r| r.weight).sum()
    }

    /// Narrow the pool by context type, then by mood.
    ///
    /// An absent context type means `general` and an absent mood means
    /// `cheerful`. Each filter is skipped when nothing with positive weight
    /// matches, so the result is never empty and always has a positive
    /// total weight.
    pub fn narrow(&self, context_type: Option<&str>, mood: Option<&str>) -> Vec<&FallbackResponse> {
        let context_type = context_type.unwrap_or(FallbackResponse::DEFAULT_CONTEXT_TYPE);
        let mood = mood.unwrap_or(FallbackResponse::DEFAULT_MOOD);
        let all: Vec<&FallbackResponse> = self.responses.iter().collect();
        let by_context = keep_matching(all, context_type, |r| &r.context_type);
        keep_matching(by_context, mood, |r| &r.mood)
    }
}

fn keep_matching<'a>(
    candidates: Vec<&'a FallbackResponse>,
    wanted: &str,
    field: impl Fn(&FallbackResponse) -> &String,
) -> Vec<&'a FallbackResponse> {
    let matching: Vec<&FallbackResponse> = candidates
        .iter()
        .copied()
        .filter(|r| field(*r) == wanted)
        .collect();
    if matching.iter().any(|r| r.weight > 0.0) {
        matching
    } else {
        candidates
    }
}
