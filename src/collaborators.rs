//! Optional collaborators
//!
//! Narrow interfaces to services the engine can consult but never requires.
//! Implementations are injected into the `Engine`; when one is missing the
//! engine degrades to a neutral score or skips the lookup.

use serde::{Deserialize, Serialize};

use crate::models::{AthleteContext, FeedbackSummary, Session, ValidationFinding};

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
  #[error("Collaborator unavailable: {0}")]
  Unavailable(String),

  #[error("Collaborator failed: {0}")]
  Failed(String),
}

/// Result of an external science-based analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedAnalysis {
  /// Expected in 0-100; anything else is neutralized by the scorer
  pub score: f64,
  #[serde(default)]
  pub findings: Vec<ValidationFinding>,
}

/// External scorer behind the "advanced science" category
pub trait AdvancedScience: Send + Sync {
  fn full_analysis(&self, session: &Session, context: &AthleteContext) -> Result<AdvancedAnalysis, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMethod {
  pub name: String,
  pub score: f64,
  #[serde(default)]
  pub rationale: Option<String>,
}

/// Training-method recommender. Output is informational only.
pub trait MethodSelector: Send + Sync {
  fn select_methods(&self, context: &AthleteContext) -> Vec<RankedMethod>;
}

/// Read-only access to prior-session aggregates
pub trait FeedbackHistory: Send + Sync {
  fn summary(&self, athlete_id: &str) -> Option<FeedbackSummary>;
}
