use crate::classifier::{ClassifiedEntry, SessionView};
use crate::models::{AthleteContext, CategoryScore, ExerciseType, MovementPattern, ValidationFinding};
use crate::rules::RuleSet;

/// Sessions with this many sport-skill entries are judged on relaxed rules
const RELAXED_SKILL_ENTRIES: usize = 6;

fn is_explosive(entry: &ClassifiedEntry) -> bool {
  entry.pattern.is_explosive() || entry.kind() == ExerciseType::Power
}

fn is_conditioning(entry: &ClassifiedEntry) -> bool {
  entry.kind() == ExerciseType::Conditioning || entry.pattern == MovementPattern::Conditioning
}

/// Execution-order conventions, each worth a fixed number of points
pub fn score_sequencing(view: &SessionView, _context: &AthleteContext, _rules: &RuleSet) -> CategoryScore {
  let named: Vec<&ClassifiedEntry> = view.entries.iter().filter(|e| e.has_name()).collect();
  if named.len() < 2 {
    return CategoryScore::neutral(ValidationFinding::info(
      "sequencing_too_short",
      "Fewer than two exercises, nothing to sequence",
    ));
  }

  let relaxed = view.sport_skill_entries() >= RELAXED_SKILL_ENTRIES;
  let mut findings = Vec::new();
  let mut score: f64 = 0.0;

  // Warm-up position
  if named[0].is_warmup {
    score += 20.0;
  } else if named[1].is_warmup {
    score += 15.0;
  } else {
    findings.push(ValidationFinding::warning("sequencing_no_warmup_first", "Session does not open with a warm-up"));
  }

  // Power before strength
  let first_power = view.working().find(|e| is_explosive(e)).map(|e| e.index);
  let first_strength = view
    .working()
    .find(|e| e.kind() == ExerciseType::Strength && !is_explosive(e))
    .map(|e| e.index);
  score += match (first_power, first_strength) {
    (Some(power), Some(strength)) if power < strength => 20.0,
    (Some(_), Some(_)) if relaxed => 15.0,
    (Some(_), Some(_)) => {
      findings.push(ValidationFinding::warning(
        "power_after_strength",
        "Explosive work comes after heavy strength work",
      ));
      0.0
    }
    _ => 15.0,
  };

  // Compound before isolation
  let last_compound = view.working().filter(|e| e.is_compound()).map(|e| e.index).max();
  let first_isolation = view.working().filter(|e| e.pattern.is_isolation()).map(|e| e.index).min();
  score += match (last_compound, first_isolation) {
    (Some(compound), Some(isolation)) if compound > isolation => {
      findings.push(ValidationFinding::info(
        "isolation_before_compound",
        "An isolation exercise precedes a compound lift",
      ));
      10.0
    }
    _ => 25.0,
  };

  // Conditioning near the end
  let span = (view.len().max(2) - 1) as f64;
  let conditioning: Vec<usize> = view.working().filter(|e| is_conditioning(e)).map(|e| e.index).collect();
  score += if conditioning.is_empty() {
    10.0
  } else if conditioning.iter().all(|i| *i as f64 / span >= 0.6) {
    20.0
  } else if relaxed {
    15.0
  } else {
    findings.push(ValidationFinding::info(
      "conditioning_early",
      "Conditioning sits in the first part of the session",
    ));
    5.0
  };

  // Cool-down last
  if named[named.len() - 1].is_cooldown {
    score += 20.0;
  } else {
    score += 5.0;
    findings.push(ValidationFinding::warning("sequencing_no_cooldown_last", "Session does not end with a cool-down"));
  }

  if relaxed {
    findings.push(ValidationFinding::info(
      "sequencing_relaxed",
      "Sport-specific session, ordering judged on relaxed rules",
    ));
  }

  CategoryScore::new(score.min(100.0), findings)
}
