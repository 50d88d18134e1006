use std::collections::BTreeSet;

use crate::classifier::{Balance, Chain, SessionView};
use crate::models::{AthleteContext, CategoryScore, ExerciseType, MovementPattern, ValidationFinding};
use crate::rules::RuleSet;

/// Sport-skill sets at which a session is judged as sport-specific work
const SPORT_SPECIFIC_SETS: u32 = 6;

/// Structural balance: push against pull, posterior against anterior chain,
/// unilateral work and core planes. Skill-dominated sessions are judged on
/// variety instead.
pub fn score_biomechanics(view: &SessionView, _context: &AthleteContext, _rules: &RuleSet) -> CategoryScore {
  if view.sport_skill_sets() >= SPORT_SPECIFIC_SETS {
    return sport_specific(view);
  }

  let mut findings = Vec::new();

  let push = view.sets_where(|e| e.balance() == Some(Balance::Push)) as f64;
  let pull = view.sets_where(|e| e.balance() == Some(Balance::Pull)) as f64;
  let push_pull = match (push > 0.0, pull > 0.0) {
    (false, false) => 15.0,
    (true, false) => {
      findings.push(ValidationFinding::warning("no_pulling", "Pushing work with no pulling counterpart"));
      0.0
    }
    (false, true) => 5.0,
    (true, true) => {
      let ratio = push / pull;
      if (0.8..=1.5).contains(&ratio) {
        25.0
      } else if (0.5..=2.0).contains(&ratio) {
        15.0
      } else {
        findings.push(ValidationFinding::info("push_pull_ratio", format!("Push:pull ratio {:.2}", ratio)));
        5.0
      }
    }
  };

  let anterior = view.sets_where(|e| e.chain() == Some(Chain::Anterior)) as f64;
  let posterior = view.sets_where(|e| e.chain() == Some(Chain::Posterior)) as f64;
  let chains = match (anterior > 0.0, posterior > 0.0) {
    (false, false) => 15.0,
    (false, true) => 25.0,
    (true, _) => {
      let ratio = posterior / anterior;
      if ratio >= 1.0 {
        25.0
      } else if ratio >= 0.7 {
        15.0
      } else {
        findings.push(ValidationFinding::info(
          "anterior_dominant",
          format!("Posterior:anterior ratio {:.2}", ratio),
        ));
        5.0
      }
    }
  };

  let unilateral_count = view.working().filter(|e| e.is_unilateral).count();
  let unilateral = match unilateral_count {
    0 => {
      findings.push(ValidationFinding::info("no_unilateral", "No unilateral work"));
      0.0
    }
    1 => 10.0,
    _ => 25.0,
  };

  let planes: BTreeSet<MovementPattern> = view.working().map(|e| e.pattern).filter(|p| p.is_core()).collect();
  let core = match planes.len() {
    0 => 10.0,
    1 => 15.0,
    _ => 25.0,
  };

  CategoryScore::new(push_pull + chains + unilateral + core, findings)
}

fn sport_specific(view: &SessionView) -> CategoryScore {
  let skills: BTreeSet<MovementPattern> = view
    .working()
    .map(|e| e.pattern)
    .filter(|p| p.is_sport_skill())
    .collect();
  let variety = match skills.len() {
    0 | 1 => 10.0,
    2 => 20.0,
    _ => 30.0,
  };
  let core = if view.any(|e| e.pattern.is_core()) { 15.0 } else { 0.0 };
  let conditioning = if view.any(|e| {
    e.kind() == ExerciseType::Conditioning
      || matches!(e.pattern, MovementPattern::Conditioning | MovementPattern::BoxingConditioning)
  }) {
    15.0
  } else {
    0.0
  };

  CategoryScore::new(
    40.0 + variety + core + conditioning,
    vec![ValidationFinding::info(
      "biomechanics_sport_specific",
      format!("Skill-dominated session with {} distinct skill patterns", skills.len()),
    )],
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::classifier::PatternClassifier;
  use crate::models::Session;
  use crate::test_utils::{boxing_session, entry, session_of};

  fn score(session: &Session) -> CategoryScore {
    let rules = RuleSet::default();
    let classifier = PatternClassifier::from_rules(&rules).unwrap();
    let context = AthleteContext::default();
    let view = SessionView::new(session, &context, &rules, &classifier);
    score_biomechanics(&view, &context, &rules)
  }

  #[test]
  fn test_balanced_session() {
    // Arrange
    let session = session_of(vec![
      entry("Bench Press", 4, "6", ExerciseType::Strength),
      entry("Pull-up", 4, "6", ExerciseType::Strength),
      entry("Bulgarian Split Squat", 3, "8", ExerciseType::Hypertrophy),
      entry("Single Leg RDL", 3, "8", ExerciseType::Hypertrophy),
      entry("Pallof Press", 3, "10", ExerciseType::Hypertrophy),
      entry("Side Plank", 3, "30 sec", ExerciseType::Hypertrophy),
    ]);

    // Act
    let result = score(&session);

    // Assert
    assert_eq!(result.score, 100.0);
  }

  #[test]
  fn test_push_only_session() {
    // Arrange
    let session = session_of(vec![
      entry("Bench Press", 4, "6", ExerciseType::Strength),
      entry("Overhead Press", 4, "6", ExerciseType::Strength),
    ]);

    // Act
    let result = score(&session);

    // Assert
    assert!(result.findings.iter().any(|f| f.id == "no_pulling"));
    assert_eq!(result.score, 0.0 + 5.0 + 0.0 + 10.0);
  }

  #[test]
  fn test_skill_session_uses_variety_rules() {
    let result = score(&boxing_session());
    assert!(result.findings.iter().any(|f| f.id == "biomechanics_sport_specific"));
    assert!(result.score >= 70.0);
  }
}
