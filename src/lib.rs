//! Workout validation and correction engine
//!
//! Classifies free-text exercise names into movement patterns, validates a
//! generated session against blocking rules, scores it across eight weighted
//! categories and repairs it with a deterministic, idempotent corrector.
//!
//! ```ignore
//! let engine = Engine::from_env()?;
//! let output = engine.process(session, &context);
//! if !output.validation.is_valid {
//!   // regenerate upstream and call `process` again
//! }
//! ```

pub mod classifier;
pub mod collaborators;
pub mod config;
pub mod corrector;
pub mod engine;
pub mod fixed_params;
pub mod models;
pub mod prescription;
pub mod rules;
pub mod scoring;
pub mod validator;

#[cfg(test)]
mod test_utils;

pub use classifier::PatternClassifier;
pub use collaborators::{AdvancedAnalysis, AdvancedScience, CollaboratorError, FeedbackHistory, MethodSelector, RankedMethod};
pub use config::ConfigError;
pub use corrector::{Correction, CorrectionNote, CorrectionPass};
pub use engine::{Engine, EngineOutput, InputError};
pub use models::{
  AthleteContext, ExerciseEntry, ExerciseType, Grade, MovementPattern, ScoreReport, Session, Sport,
  ValidationFinding, ValidationResult,
};
pub use rules::RuleSet;
