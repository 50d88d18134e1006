//! Orchestrator
//!
//! `Engine` owns the compiled rule set and the optional collaborators and
//! runs one pass of correct -> validate -> score per call. It keeps no state
//! between calls and performs no retries.

use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

use crate::classifier::{PatternClassifier, SessionView};
use crate::collaborators::{AdvancedScience, FeedbackHistory, MethodSelector};
use crate::config::ConfigError;
use crate::corrector::{Correction, CorrectionNote, CorrectionPass, Corrector, NamingPatterns};
use crate::models::{AthleteContext, ExerciseEntry, MovementPattern, ScoreReport, Session, ValidationResult};
use crate::rules::RuleSet;
use crate::scoring::{self, ScoringCollaborators};
use crate::validator;

/// ---------------------------------------------------------------------------
/// Input Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum InputError {
  #[error("Session must be a sequence of exercises, got {0}")]
  NotASequence(&'static str),
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object without an exercises array",
  }
}

/// Read a session from either a bare array of entries or an object with an
/// `exercises` array. Entries that are not objects become unnamed entries.
fn session_from_value(value: &Value) -> Result<Session, InputError> {
  let (fields, items) = match value {
    Value::Array(items) => (None, items),
    Value::Object(map) => match map.get("exercises") {
      Some(Value::Array(items)) => (Some(map), items),
      _ => return Err(InputError::NotASequence(kind_of(value))),
    },
    other => return Err(InputError::NotASequence(kind_of(other))),
  };

  let exercises = items
    .iter()
    .enumerate()
    .map(|(index, item)| {
      serde_json::from_value::<ExerciseEntry>(item.clone()).unwrap_or_else(|e| {
        tracing::debug!(index, error = %e, "Unreadable entry kept as an unnamed entry");
        ExerciseEntry::default()
      })
    })
    .collect();

  let text = |key: &str| fields.and_then(|m| m.get(key)).and_then(Value::as_str).map(String::from);
  Ok(Session {
    title: text("title").unwrap_or_default(),
    sport: text("sport"),
    exercises,
    estimated_duration_minutes: fields
      .and_then(|m| m.get("estimated_duration_minutes"))
      .and_then(Value::as_u64)
      .and_then(|v| u32::try_from(v).ok()),
    volume_scaling: fields
      .and_then(|m| m.get("volume_scaling"))
      .and_then(|v| serde_json::from_value(v.clone()).ok()),
  })
}

/// ---------------------------------------------------------------------------
/// Engine Output
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EngineOutput {
  pub session: Session,
  pub validation: ValidationResult,
  pub score: ScoreReport,
  pub corrections: Vec<CorrectionNote>,
  #[serde(skip)]
  entries_before: usize,
}

impl EngineOutput {
  pub fn corrections_applied(&self) -> Vec<String> {
    self.corrections.iter().map(|n| n.to_string()).collect()
  }

  /// Corrections grouped by pass, in pipeline order
  pub fn render_diff(&self) -> String {
    if self.corrections.is_empty() {
      return format!("No corrections applied ({} entries)", self.session.exercises.len());
    }

    let mut lines = vec![format!(
      "{} correction(s), entries {} -> {}",
      self.corrections.len(),
      self.entries_before,
      self.session.exercises.len()
    )];
    for pass in CorrectionPass::ALL {
      let notes: Vec<&CorrectionNote> = self.corrections.iter().filter(|n| n.pass == pass).collect();
      if notes.is_empty() {
        continue;
      }
      lines.push(format!("{}:", pass.label()));
      for note in notes {
        match note.entry_index {
          Some(index) => lines.push(format!("  #{} {}", index, note.message)),
          None => lines.push(format!("  {}", note.message)),
        }
      }
    }
    lines.join("\n")
  }

  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }
}

/// ---------------------------------------------------------------------------
/// Engine
/// ---------------------------------------------------------------------------

pub struct Engine {
  rules: RuleSet,
  classifier: PatternClassifier,
  naming: NamingPatterns,
  advanced: Option<Arc<dyn AdvancedScience>>,
  methods: Option<Arc<dyn MethodSelector>>,
  feedback: Option<Arc<dyn FeedbackHistory>>,
}

impl Engine {
  /// Compile the rule set. Invalid override patterns are reported here,
  /// never while processing.
  pub fn new(rules: RuleSet) -> Result<Self, ConfigError> {
    rules.check()?;
    let classifier = PatternClassifier::from_rules(&rules)?;
    let naming = NamingPatterns::compile(&rules.naming)?;
    Ok(Self {
      rules,
      classifier,
      naming,
      advanced: None,
      methods: None,
      feedback: None,
    })
  }

  /// Engine over the rule set named by `WORKOUT_GUARD_RULES`, or the built-in one
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::new(RuleSet::from_env()?)
  }

  pub fn with_advanced_science(mut self, advanced: Arc<dyn AdvancedScience>) -> Self {
    self.advanced = Some(advanced);
    self
  }

  pub fn with_method_selector(mut self, methods: Arc<dyn MethodSelector>) -> Self {
    self.methods = Some(methods);
    self
  }

  pub fn with_feedback_history(mut self, feedback: Arc<dyn FeedbackHistory>) -> Self {
    self.feedback = Some(feedback);
    self
  }

  pub fn rules(&self) -> &RuleSet {
    &self.rules
  }

  pub fn classify(&self, name: &str) -> MovementPattern {
    self.classifier.classify(name)
  }

  pub fn correct(&self, session: Session, context: &AthleteContext) -> Correction {
    Corrector::new(&self.rules, &self.classifier, &self.naming).correct(session, context)
  }

  pub fn validate(&self, session: &Session, context: &AthleteContext) -> ValidationResult {
    let view = SessionView::new(session, context, &self.rules, &self.classifier);
    validator::validate(&view, context, &self.rules)
  }

  pub fn score(&self, session: &Session, context: &AthleteContext) -> ScoreReport {
    let view = SessionView::new(session, context, &self.rules, &self.classifier);
    scoring::score(&view, context, &self.rules, self.collaborators())
  }

  /// Correct once, then validate and score the corrected session
  pub fn process(&self, session: Session, context: &AthleteContext) -> EngineOutput {
    let context = self.enrich(context);
    let entries_before = session.exercises.len();

    let Correction { session, notes } = self.correct(session, &context);
    let validation = self.validate(&session, &context);
    let score = self.score(&session, &context);

    tracing::info!(
      entries_before,
      entries_after = session.exercises.len(),
      corrections = notes.len(),
      valid = validation.is_valid,
      score = score.overall_score,
      grade = %score.grade,
      "Session processed"
    );

    EngineOutput {
      session,
      validation,
      score,
      corrections: notes,
      entries_before,
    }
  }

  /// `process` for untyped JSON. Wrong top-level shape is the only error.
  pub fn process_value(&self, value: &Value, context: &AthleteContext) -> Result<EngineOutput, InputError> {
    let session = session_from_value(value)?;
    Ok(self.process(session, context))
  }

  fn collaborators(&self) -> ScoringCollaborators<'_> {
    ScoringCollaborators {
      advanced: self.advanced.as_deref(),
      methods: self.methods.as_deref(),
    }
  }

  /// Context with feedback looked up from history when the caller gave none
  fn enrich<'c>(&self, context: &'c AthleteContext) -> Cow<'c, AthleteContext> {
    let (Some(history), Some(athlete_id), None) = (&self.feedback, &context.athlete_id, &context.feedback) else {
      return Cow::Borrowed(context);
    };
    match history.summary(athlete_id) {
      Some(summary) => {
        tracing::debug!(athlete_id = %athlete_id, "Feedback summary loaded from history");
        Cow::Owned(context.clone().with_feedback(summary))
      }
      None => Cow::Borrowed(context),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{ExerciseType, FeedbackSummary, Grade, RpeTrend};
  use crate::test_utils::{
    arb_context, arb_session, boxing_context, boxing_session, deload_context, engine, engine_with_advanced, entry,
    gym_session, session_of, warmup, StaticFeedback,
  };
  use pretty_assertions::assert_eq;
  use proptest::prelude::*;
  use serde_json::json;

  #[test]
  fn test_engine_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Engine>();
  }

  #[test]
  fn test_round_based_normalization() {
    // Arrange
    let session = session_of(vec![ExerciseEntry::new(
      "Heavy Bag: 6x3min",
      None,
      "3",
      ExerciseType::Conditioning,
    )]);

    // Act
    let output = engine().process(session, &AthleteContext::default());

    // Assert
    let bag = output
      .session
      .exercises
      .iter()
      .find(|e| e.name.contains("Heavy Bag"))
      .unwrap();
    assert_eq!(bag.sets, Some(6));
    assert!(bag.reps.starts_with("3 minute"));
  }

  #[test]
  fn test_deload_floor_preserved() {
    // Arrange
    let session = session_of(vec![entry("Back Squat", 8, "5", ExerciseType::Strength).with_rest("3 min")]);
    let context = deload_context();

    // Act
    let output = engine().process(session, &context);

    // Assert
    let squat = output.session.exercises.iter().find(|e| e.name == "Back Squat").unwrap();
    assert!(squat.sets.unwrap() >= 2);
  }

  #[test]
  fn test_missing_warmup_scenario() {
    // Arrange
    let value = json!([{"name": "Back Squat", "sets": 4, "reps": "6", "type": "strength"}]);

    // Act
    let output = engine().process_value(&value, &AthleteContext::default()).unwrap();

    // Assert
    let first = output.session.exercises[0].name.to_lowercase();
    assert!(first.contains("warm") || first.contains("dynamic") || first.contains("mobility"));
    assert_eq!(output.session.exercises[1].name, "Back Squat");
  }

  #[test]
  fn test_vague_name_scenario() {
    // Arrange
    let value = json!([{"name": "Conditioning", "type": "conditioning"}]);

    // Act
    let output = engine().process_value(&value, &AthleteContext::default()).unwrap();

    // Assert
    assert!(output.session.exercises.iter().all(|e| e.name != "Conditioning"));
    assert!(output.corrections.iter().any(|n| n.pass == CorrectionPass::Naming));
  }

  #[test]
  fn test_neck_duration_is_blocking_before_correction() {
    // Arrange
    let session = session_of(vec![entry("Neck Extension", 4, "3 min", ExerciseType::Conditioning)]);

    // Act
    let result = engine().validate(&session, &AthleteContext::default());

    // Assert
    assert!(!result.is_valid);
    assert!(result.blocking_ids().iter().any(|id| id.contains("neck") && id.contains("duration")));
  }

  #[test]
  fn test_well_formed_sessions_pass_through() {
    // Act
    let gym = engine().process(gym_session(), &AthleteContext::default());
    let boxing = engine().process(boxing_session(), &boxing_context());

    // Assert
    assert!(gym.corrections.is_empty(), "{}", gym.render_diff());
    assert_eq!(gym.session, gym_session());
    assert!(gym.validation.is_valid, "{:?}", gym.validation.blocking_ids());
    assert!(boxing.validation.is_valid, "{:?}", boxing.validation.blocking_ids());
  }

  #[test]
  fn test_cooldown_with_mobility_is_kept() {
    // Arrange
    let session = session_of(vec![
      warmup(),
      entry("Back Squat", 4, "5", ExerciseType::Strength).with_rest("3 min"),
      entry("Cool-down: 10min mobility & static stretching", 1, "10 min", ExerciseType::Cooldown),
    ]);
    let context = AthleteContext::default();

    // Act
    let validation = engine().validate(&session, &context);
    let output = engine().process(session, &context);

    // Assert
    assert!(validation.is_valid, "{:?}", validation.blocking_ids());
    let names: Vec<&str> = output.session.exercises.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names.len(), 3, "{}", output.render_diff());
    assert_eq!(names[2], "Cool-down: 10min mobility & static stretching");
    assert!(!output.corrections.iter().any(|n| n.pass == CorrectionPass::Structure));
  }

  #[test]
  fn test_oversized_rest_does_not_panic() {
    // Arrange
    let session = session_of(vec![entry("Back Squat", 4, "5", ExerciseType::Strength).with_rest("99999999:00")]);

    // Act
    let output = engine().process(session, &AthleteContext::default());

    // Assert
    assert!(output.session.exercises.iter().any(|e| e.name == "Back Squat"));
  }

  #[test]
  fn test_wrong_shape_is_rejected() {
    // Arrange
    let engine = engine();
    let context = AthleteContext::default();

    // Act
    let number = engine.process_value(&json!(42), &context);
    let object = engine.process_value(&json!({"title": "Leg day"}), &context);

    // Assert
    assert!(matches!(number, Err(InputError::NotASequence("a number"))));
    assert!(matches!(object, Err(InputError::NotASequence(_))));
  }

  #[test]
  fn test_object_with_exercises_keeps_metadata() {
    // Arrange
    let value = json!({
      "title": "Fight prep",
      "sport": "boxing",
      "exercises": [{"name": "Shadow Boxing", "sets": "3", "reps": "3 min"}, 7]
    });

    // Act
    let session = session_from_value(&value).unwrap();

    // Assert
    assert_eq!(session.title, "Fight prep");
    assert_eq!(session.sport.as_deref(), Some("boxing"));
    assert_eq!(session.exercises.len(), 2);
    assert!(!session.exercises[1].has_name());
  }

  #[test]
  fn test_feedback_history_enriches_a_copy() {
    // Arrange
    let summary = FeedbackSummary {
      rpe_trend: Some(RpeTrend::Rising),
      pain_areas: vec!["shoulder".into()],
      ..Default::default()
    };
    let engine = engine().with_feedback_history(Arc::new(StaticFeedback(summary)));
    let context = AthleteContext {
      athlete_id: Some("athlete-7".into()),
      ..Default::default()
    };
    let session = session_of(vec![entry("Overhead Press", 4, "6", ExerciseType::Strength)]);

    // Act
    let output = engine.process(session, &context);

    // Assert
    assert!(context.feedback.is_none());
    let safety = output.score.category(crate::models::Category::Safety).unwrap();
    assert!(safety.score < 100.0);
  }

  #[test]
  fn test_advanced_science_moves_the_overall_score() {
    // Act
    let low = engine_with_advanced(0.0).process(gym_session(), &AthleteContext::default());
    let high = engine_with_advanced(100.0).process(gym_session(), &AthleteContext::default());

    // Assert
    assert!(high.score.overall_score > low.score.overall_score);
    assert_ne!(high.score.grade, Grade::F);
  }

  #[test]
  fn test_render_diff_groups_by_pass() {
    // Arrange
    let session = session_of(vec![entry("Back Squat", 4, "6", ExerciseType::Strength)]);

    // Act
    let output = engine().process(session, &AthleteContext::default());
    let diff = output.render_diff();

    // Assert
    assert!(diff.starts_with(&format!("{} correction(s), entries 1 -> 3", output.corrections.len())));
    assert!(diff.contains("Structural completion:"));
    assert_eq!(output.corrections_applied().len(), output.corrections.len());
  }

  #[test]
  fn test_output_serializes() {
    // Act
    let json = engine().process(gym_session(), &AthleteContext::default()).to_json().unwrap();

    // Assert
    let parsed: Value = serde_json::from_str(&json).unwrap();
    assert!(parsed["validation"]["is_valid"].is_boolean());
    assert!(parsed["score"]["overall_score"].is_u64());
    assert!(parsed.get("entries_before").is_none());
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_processing_is_stable(session in arb_session(), context in arb_context()) {
      let engine = engine();
      let once = engine.process(session, &context);
      let twice = engine.process(once.session.clone(), &context);
      prop_assert_eq!(&twice.session, &once.session);
      prop_assert_eq!(&twice.validation, &once.validation);
    }

    #[test]
    fn test_validation_is_deterministic(session in arb_session(), context in arb_context()) {
      let engine = engine();
      prop_assert_eq!(engine.validate(&session, &context), engine.validate(&session, &context));
    }
  }
}
