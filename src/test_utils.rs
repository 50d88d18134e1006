//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Session and entry factories
//! - Athlete context fixtures
//! - Mock collaborators
//! - Proptest strategies for generated sessions

use std::sync::Arc;

use proptest::prelude::*;

use crate::collaborators::{
  AdvancedAnalysis, AdvancedScience, CollaboratorError, FeedbackHistory, MethodSelector, RankedMethod,
};
use crate::engine::Engine;
use crate::models::{
  AthleteContext, ExerciseEntry, ExerciseType, FeedbackSummary, Phase, Session, Sport, ValidationFinding,
};
use crate::rules::RuleSet;

/// ---------------------------------------------------------------------------
/// Session Factories
/// ---------------------------------------------------------------------------

/// Entry with an explicit set count
pub fn entry(name: &str, sets: u32, reps: &str, exercise_type: ExerciseType) -> ExerciseEntry {
  ExerciseEntry::new(name, Some(sets), reps, exercise_type)
}

pub fn session_of(exercises: Vec<ExerciseEntry>) -> Session {
  Session::new("Test session", exercises)
}

pub fn warmup() -> ExerciseEntry {
  entry("Dynamic Warm-up: 10min", 1, "10 min", ExerciseType::Warmup)
}

pub fn cooldown() -> ExerciseEntry {
  entry("Cool-down: 8min", 1, "8 min", ExerciseType::Cooldown)
}

/// A complete, valid general-gym session
pub fn gym_session() -> Session {
  session_of(vec![
    warmup(),
    entry("Back Squat", 4, "5", ExerciseType::Strength).with_rest("3 min"),
    entry("Bench Press", 4, "6", ExerciseType::Strength).with_rest("2 min"),
    entry("Barbell Row", 4, "8-10", ExerciseType::Hypertrophy).with_rest("90s"),
    entry("Romanian Deadlift", 3, "8", ExerciseType::Hypertrophy).with_rest("2 min"),
    entry("Pallof Press", 3, "10/side", ExerciseType::Hypertrophy).with_rest("60s"),
    cooldown(),
  ])
}

/// A complete, valid boxing session
pub fn boxing_session() -> Session {
  session_of(vec![
    warmup(),
    entry("Shadow Boxing: 3x3min", 3, "3 minutes", ExerciseType::Technique).with_rest("60s"),
    entry("Heavy Bag: 4x3min", 4, "3 minutes", ExerciseType::Conditioning).with_rest("60s"),
    entry("Neck Flexion", 2, "15", ExerciseType::Hypertrophy).with_rest("30s"),
    entry("Neck Extension", 2, "15", ExerciseType::Hypertrophy).with_rest("30s"),
    entry("Russian Twist", 3, "20", ExerciseType::Hypertrophy).with_rest("45s"),
    cooldown(),
  ])
  .with_sport("boxing")
}

pub fn football_session() -> Session {
  session_of(vec![
    warmup(),
    entry("Box Jumps", 4, "5", ExerciseType::Power).with_rest("2 min"),
    entry("Back Squat", 4, "5", ExerciseType::Strength).with_rest("3 min"),
    entry("Nordic Hamstring Curl", 3, "5", ExerciseType::Strength).with_rest("90s"),
    entry("Walking Lunge", 3, "10/side", ExerciseType::Hypertrophy).with_rest("90s"),
    entry("Copenhagen Plank", 3, "30 sec", ExerciseType::Hypertrophy).with_rest("60s"),
    entry("Pallof Press", 3, "10/side", ExerciseType::Hypertrophy).with_rest("60s"),
    cooldown(),
  ])
  .with_sport("football")
}

/// ---------------------------------------------------------------------------
/// Context Fixtures
/// ---------------------------------------------------------------------------

pub fn boxing_context() -> AthleteContext {
  AthleteContext::for_sport(Sport::Boxing)
}

pub fn football_context() -> AthleteContext {
  AthleteContext::for_sport(Sport::Football)
}

pub fn deload_context() -> AthleteContext {
  AthleteContext::default().with_phase(Phase::Deload)
}

/// ---------------------------------------------------------------------------
/// Mock Collaborators
/// ---------------------------------------------------------------------------

/// Advanced-science scorer that always returns the same score
pub struct FixedAdvancedScience(pub f64);

impl AdvancedScience for FixedAdvancedScience {
  fn full_analysis(&self, _session: &Session, _context: &AthleteContext) -> Result<AdvancedAnalysis, CollaboratorError> {
    Ok(AdvancedAnalysis {
      score: self.0,
      findings: vec![ValidationFinding::info("mock_analysis", "Mock analysis ran")],
    })
  }
}

pub struct FailingAdvancedScience;

impl AdvancedScience for FailingAdvancedScience {
  fn full_analysis(&self, _session: &Session, _context: &AthleteContext) -> Result<AdvancedAnalysis, CollaboratorError> {
    Err(CollaboratorError::Unavailable("mock outage".into()))
  }
}

pub struct StaticMethods;

impl MethodSelector for StaticMethods {
  fn select_methods(&self, _context: &AthleteContext) -> Vec<RankedMethod> {
    vec![
      RankedMethod { name: "Cluster sets".into(), score: 0.9, rationale: Some("High intent".into()) },
      RankedMethod { name: "Contrast training".into(), score: 0.7, rationale: None },
    ]
  }
}

/// Feedback store holding one summary for every athlete
pub struct StaticFeedback(pub FeedbackSummary);

impl FeedbackHistory for StaticFeedback {
  fn summary(&self, _athlete_id: &str) -> Option<FeedbackSummary> {
    Some(self.0.clone())
  }
}

/// Engine over the built-in rule set
pub fn engine() -> Engine {
  Engine::new(RuleSet::default()).unwrap()
}

pub fn engine_with_advanced(score: f64) -> Engine {
  engine().with_advanced_science(Arc::new(FixedAdvancedScience(score)))
}

/// ---------------------------------------------------------------------------
/// Proptest Strategies
/// ---------------------------------------------------------------------------

const NAMES: &[&str] = &[
  "Back Squat",
  "Front Squat",
  "Bench Press",
  "Pull-up",
  "Romanian Deadlift",
  "Heavy Bag: 6x3min",
  "Heavy Bag",
  "Shadow Boxing",
  "Jump Rope",
  "Neck Extension",
  "Neck Strengthening: Flexion 2x15 + Extension 2x15",
  "Plank",
  "Side Plank 3x45s",
  "Box Jumps",
  "Power Clean",
  "Conditioning",
  "Cardio",
  "Core",
  "Sprints: 6x (30m)",
  "Agility Drill",
  "Dynamic Warm-up",
  "Warm-up: 5min jog",
  "Cool-down",
  "Static Stretching",
  "MetCon: 4x (10 Burpees + 15 KB Swings)",
  "Back Squat: 4x6-8 @ RPE 8",
  "Nordic Hamstring Curl",
  "Leg Extension",
  "",
];

const REPS: &[&str] = &["", "5", "3", "12", "8-10", "3 min", "45 sec", "2 min", "rounds", "n/a", "4x3 min", "AMRAP"];

const RESTS: &[Option<&str>] = &[None, Some("30s"), Some("60s"), Some("90s"), Some("2 min"), Some("0")];

const TYPES: &[ExerciseType] = &[
  ExerciseType::Warmup,
  ExerciseType::Strength,
  ExerciseType::Hypertrophy,
  ExerciseType::Power,
  ExerciseType::Conditioning,
  ExerciseType::Technique,
  ExerciseType::Cooldown,
  ExerciseType::Unknown,
];

pub fn arb_entry() -> impl Strategy<Value = ExerciseEntry> {
  (
    prop::sample::select(NAMES),
    prop::option::of(1u32..=10),
    prop::sample::select(REPS),
    prop::sample::select(RESTS),
    prop::sample::select(TYPES),
  )
    .prop_map(|(name, sets, reps, rest, exercise_type)| ExerciseEntry {
      name: name.to_string(),
      sets,
      reps: reps.to_string(),
      rest: rest.map(String::from),
      exercise_type,
      notes: None,
    })
}

pub fn arb_session() -> impl Strategy<Value = Session> {
  (
    prop::collection::vec(arb_entry(), 0..9),
    prop::sample::select(vec!["Strength day", "Light recovery", "Boxing conditioning", "Deload week"]),
  )
    .prop_map(|(exercises, title)| Session::new(title, exercises))
}

pub fn arb_context() -> impl Strategy<Value = AthleteContext> {
  (
    prop::sample::select(vec![Sport::Gym, Sport::Boxing, Sport::Football, Sport::Basketball]),
    prop::option::of(prop::sample::select(vec![
      Phase::Accumulation,
      Phase::Intensification,
      Phase::Peaking,
      Phase::Deload,
    ])),
    prop::option::of(40.0f64..100.0),
  )
    .prop_map(|(sport, phase, compliance_pct)| AthleteContext {
      sport: Some(sport),
      phase,
      compliance_pct,
      ..Default::default()
    })
}
