//! Constraint validator
//!
//! Runs every named rule against a classified session and collects the
//! findings. Rules never short-circuit: a session with three blocking
//! problems reports all three. Validity depends on blocking findings alone.

use std::collections::BTreeMap;

use crate::classifier::{ClassifiedEntry, SessionView};
use crate::models::{
  AthleteContext, ExerciseType, MovementPattern, Sport, ValidationFinding, ValidationResult, ValidationStats,
};
use crate::prescription::{superset_role, SupersetRole};
use crate::rules::{ForbiddenCombination, RuleSet};

/// ---------------------------------------------------------------------------
/// Rule Table
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
  Minimum,
  Blocking,
  Advisory,
}

type Check = fn(&SessionView, &AthleteContext, &RuleSet) -> Vec<ValidationFinding>;

struct NamedRule {
  name: &'static str,
  tier: Tier,
  check: Check,
}

const RULES: &[NamedRule] = &[
  NamedRule { name: "warmup", tier: Tier::Minimum, check: check_warmup },
  NamedRule { name: "cooldown", tier: Tier::Minimum, check: check_cooldown },
  NamedRule { name: "boxing_minimums", tier: Tier::Minimum, check: check_boxing_minimums },
  NamedRule { name: "strength_after_conditioning", tier: Tier::Blocking, check: check_strength_after_conditioning },
  NamedRule { name: "forbidden_combinations", tier: Tier::Blocking, check: check_forbidden_combinations },
  NamedRule { name: "duration_on_count_pattern", tier: Tier::Blocking, check: check_duration_on_count_pattern },
  NamedRule { name: "low_rep_strength_rest", tier: Tier::Blocking, check: check_low_rep_strength_rest },
  NamedRule { name: "pattern_ceilings", tier: Tier::Blocking, check: check_pattern_ceilings },
  NamedRule { name: "boxing_round_ceiling", tier: Tier::Blocking, check: check_round_ceiling },
  NamedRule { name: "conditioning_overload", tier: Tier::Blocking, check: check_conditioning_overload },
  NamedRule { name: "maximum_duration", tier: Tier::Blocking, check: check_maximum_duration },
  NamedRule { name: "exercise_count", tier: Tier::Advisory, check: check_exercise_count },
  NamedRule { name: "session_duration", tier: Tier::Advisory, check: check_session_duration },
  NamedRule { name: "strength_exercise_count", tier: Tier::Advisory, check: check_strength_exercise_count },
  NamedRule { name: "pattern_skew", tier: Tier::Advisory, check: check_pattern_skew },
  NamedRule { name: "round_based_counts", tier: Tier::Advisory, check: check_round_based_counts },
];

/// Evaluate every rule against the session
pub fn validate(view: &SessionView, context: &AthleteContext, rules: &RuleSet) -> ValidationResult {
  let mut findings = Vec::new();

  for rule in RULES {
    let produced = (rule.check)(view, context, rules);
    for finding in &produced {
      if finding.is_blocking() {
        tracing::debug!(rule = rule.name, id = %finding.id, "Blocking finding");
      }
    }
    debug_assert!(
      rule.tier != Tier::Advisory || produced.iter().all(|f| !f.is_blocking()),
      "advisory rule {} produced a blocking finding",
      rule.name
    );
    findings.extend(produced);
  }

  if findings.iter().all(|f| !f.is_blocking()) {
    findings.push(ValidationFinding::success("session_valid", "All blocking checks passed"));
  }

  ValidationResult::from_findings(findings, stats(view))
}

fn stats(view: &SessionView) -> ValidationStats {
  let mut pattern_counts: BTreeMap<MovementPattern, u32> = BTreeMap::new();
  for entry in view.entries.iter().filter(|e| e.has_name()) {
    *pattern_counts.entry(entry.pattern).or_default() += 1;
  }

  ValidationStats {
    total_exercises: view.len(),
    main_exercises: view.entries.iter().filter(|e| e.is_main()).count(),
    total_sets: view.session.total_sets(),
    boxing_rounds: view.boxing_rounds(),
    strength_exercises: strength_entries(view).count(),
    estimated_minutes: view.session.estimated_minutes(),
    pattern_counts,
  }
}

fn named<'v, 'a>(view: &'v SessionView<'a>) -> impl Iterator<Item = &'v ClassifiedEntry<'a>> {
  view.entries.iter().filter(|e| e.has_name())
}

fn strength_entries<'v, 'a>(view: &'v SessionView<'a>) -> impl Iterator<Item = &'v ClassifiedEntry<'a>> {
  view.working().filter(|e| e.kind() == ExerciseType::Strength)
}

/// ---------------------------------------------------------------------------
/// Minimum Requirements
/// ---------------------------------------------------------------------------

fn check_warmup(view: &SessionView, _context: &AthleteContext, rules: &RuleSet) -> Vec<ValidationFinding> {
  let Some(first) = named(view).next() else {
    return vec![ValidationFinding::blocking(
      "missing_warmup",
      "Session has no exercises, so no warm-up",
      "Start the session with a 10 minute dynamic warm-up",
    )];
  };

  if !first.is_warmup {
    let finding = if first.lower_name().contains("warm") || first.pattern.is_sport_skill() {
      ValidationFinding::blocking(
        "warmup_is_sport_skill",
        format!("'{}' is a sport drill, not a mobility/dynamic warm-up", first.name()),
        "Open with joint mobility and dynamic prep before any skill work",
      )
    } else {
      ValidationFinding::blocking(
        "missing_warmup",
        format!("Session starts with '{}' instead of a warm-up", first.name()),
        "Add a 10 minute dynamic warm-up as the first exercise",
      )
    };
    return vec![finding.at(first.index)];
  }

  let minutes: f64 = named(view)
    .take_while(|e| e.is_warmup)
    .map(|e| e.entry.prescribed_minutes())
    .sum();
  if minutes < rules.limits.min_warmup_minutes {
    return vec![ValidationFinding::blocking(
      "short_warmup",
      format!(
        "Warm-up lasts {:.0} min, minimum is {:.0} min",
        minutes, rules.limits.min_warmup_minutes
      ),
      format!("Extend the warm-up to at least {:.0} minutes", rules.limits.min_warmup_minutes),
    )
    .at(first.index)];
  }
  vec![]
}

fn check_cooldown(view: &SessionView, _context: &AthleteContext, _rules: &RuleSet) -> Vec<ValidationFinding> {
  match named(view).last() {
    Some(last) if last.is_cooldown => vec![],
    Some(last) => vec![ValidationFinding::blocking(
      "missing_cooldown",
      format!("Session ends with '{}' instead of a cool-down", last.name()),
      "Finish with 5-10 minutes of easy movement and static stretching",
    )
    .at(last.index)],
    None => vec![ValidationFinding::blocking(
      "missing_cooldown",
      "Session has no exercises, so no cool-down",
      "Finish with 5-10 minutes of easy movement and static stretching",
    )],
  }
}

fn check_boxing_minimums(view: &SessionView, _context: &AthleteContext, rules: &RuleSet) -> Vec<ValidationFinding> {
  if view.sport != Sport::Boxing {
    return vec![];
  }
  let limits = &rules.limits;
  let mut findings = Vec::new();

  let rounds = view.boxing_rounds();
  if rounds < limits.boxing_min_rounds {
    findings.push(ValidationFinding::blocking(
      "boxing_insufficient_rounds",
      format!("{} rounds of round-based work, boxing needs at least {}", rounds, limits.boxing_min_rounds),
      "Add shadow boxing or bag rounds (3 minutes each, 1 minute rest)",
    ));
  }

  let directions = limits.neck_direction_count(
    view
      .working()
      .filter(|e| e.pattern == MovementPattern::Neck)
      .map(|e| e.name()),
  );
  if directions < limits.neck_min_directions {
    findings.push(ValidationFinding::blocking(
      "boxing_insufficient_neck_directions",
      format!(
        "Neck work covers {} direction(s), boxing needs at least {}",
        directions, limits.neck_min_directions
      ),
      "Train neck flexion, extension and lateral flexion (2x12-15 each)",
    ));
  }
  findings
}

/// ---------------------------------------------------------------------------
/// Blocking Predicates
/// ---------------------------------------------------------------------------

fn check_strength_after_conditioning(
  view: &SessionView,
  _context: &AthleteContext,
  _rules: &RuleSet,
) -> Vec<ValidationFinding> {
  let Some(conditioning) = view.working().find(|e| e.is_heavy_conditioning()) else {
    return vec![];
  };
  view
    .working()
    .filter(|e| e.index > conditioning.index && e.kind() == ExerciseType::Strength)
    .map(|e| {
      ValidationFinding::blocking(
        "strength_after_conditioning",
        format!("'{}' comes after conditioning work '{}'", e.name(), conditioning.name()),
        "Move strength work before conditioning; fatigue degrades force output and technique",
      )
      .at(e.index)
    })
    .collect()
}

/// Each group matched by a distinct entry
fn combination_matches(groups: &[Vec<String>], candidates: &[&ClassifiedEntry<'_>], used: &mut Vec<usize>) -> bool {
  let Some((group, rest)) = groups.split_first() else {
    return true;
  };
  for candidate in candidates {
    if used.contains(&candidate.index) {
      continue;
    }
    let name = candidate.lower_name();
    if group.iter().any(|k| name.contains(k.as_str())) {
      used.push(candidate.index);
      if combination_matches(rest, candidates, used) {
        return true;
      }
      used.pop();
    }
  }
  false
}

fn combination_present(view: &SessionView, combo: &ForbiddenCombination) -> Option<Vec<usize>> {
  let candidates: Vec<&ClassifiedEntry> = view
    .working()
    .filter(|e| !combo.heavy_only || e.is_heavy())
    .collect();
  let mut used = Vec::new();
  combination_matches(&combo.groups, &candidates, &mut used).then_some(used)
}

fn check_forbidden_combinations(
  view: &SessionView,
  _context: &AthleteContext,
  rules: &RuleSet,
) -> Vec<ValidationFinding> {
  rules
    .forbidden_combinations
    .iter()
    .filter(|combo| !combo.groups.is_empty())
    .filter_map(|combo| {
      combination_present(view, combo).map(|indices| {
        let finding = ValidationFinding::blocking(combo.id.clone(), combo.message.clone(), combo.fix.clone());
        match indices.iter().max() {
          Some(index) => finding.at(*index),
          None => finding,
        }
      })
    })
    .collect()
}

fn check_duration_on_count_pattern(
  view: &SessionView,
  _context: &AthleteContext,
  _rules: &RuleSet,
) -> Vec<ValidationFinding> {
  view
    .working()
    .filter_map(|e| {
      let fixed = e.fixed?;
      fixed.duration_on_count_pattern(&e.reps).then(|| {
        ValidationFinding::blocking(
          format!("{}_duration_based", e.pattern.as_str()),
          format!(
            "'{}' is prescribed as '{}', but {} work is never duration-based",
            e.name(),
            e.entry.reps,
            e.pattern.as_str().replace('_', " ")
          ),
          format!("Prescribe reps instead, e.g. {}", fixed.count_reps()),
        )
        .at(e.index)
      })
    })
    .collect()
}

fn check_low_rep_strength_rest(
  view: &SessionView,
  _context: &AthleteContext,
  rules: &RuleSet,
) -> Vec<ValidationFinding> {
  let guide = &rules.strength_rest;
  view
    .working()
    .filter(|e| e.kind() == ExerciseType::Strength && e.is_compound())
    .filter(|e| superset_role(e.name()) != Some(SupersetRole::Lead))
    .filter_map(|e| {
      let reps = e.reps.max_count().filter(|r| *r > 0 && *r <= guide.low_rep_ceiling)?;
      let rest = e.rest_seconds.filter(|r| *r > 0 && *r < guide.blocking_below_seconds)?;
      let minimum = guide.minimum_for(reps).unwrap_or(guide.blocking_below_seconds);
      Some(
        ValidationFinding::blocking(
          "insufficient_rest_low_rep_strength",
          format!("'{}' at {} reps has only {}s rest", e.name(), reps, rest),
          format!("Rest at least {}s between heavy sets", minimum),
        )
        .at(e.index),
      )
    })
    .collect()
}

fn check_pattern_ceilings(view: &SessionView, _context: &AthleteContext, rules: &RuleSet) -> Vec<ValidationFinding> {
  rules
    .limits
    .pattern_ceilings
    .iter()
    .filter_map(|(pattern, ceiling)| {
      let matching: Vec<&ClassifiedEntry> = view.working().filter(|e| e.pattern == *pattern).collect();
      let count = matching.len() as u32;
      (count > *ceiling).then(|| {
        let finding = ValidationFinding::blocking(
          format!("pattern_ceiling_{}", pattern.as_str()),
          format!("{} {} exercises, maximum is {}", count, pattern.as_str().replace('_', " "), ceiling),
          format!("Keep at most {} and swap the rest for other patterns", ceiling),
        );
        match matching.last() {
          Some(last) => finding.at(last.index),
          None => finding,
        }
      })
    })
    .collect()
}

fn check_round_ceiling(view: &SessionView, _context: &AthleteContext, rules: &RuleSet) -> Vec<ValidationFinding> {
  let rounds = view.boxing_rounds();
  let limits = &rules.limits;
  if rounds > limits.max_rounds {
    vec![ValidationFinding::blocking(
      "too_many_boxing_rounds",
      format!("{} rounds of round-based work, maximum is {}", rounds, limits.max_rounds),
      format!("Cut round-based work to {} rounds or fewer", limits.max_rounds),
    )]
  } else if rounds >= limits.boxing_rounds_warning {
    vec![ValidationFinding::warning(
      "boxing_rounds_high",
      format!("{} rounds is at the top of the recommended range", rounds),
    )]
  } else {
    vec![]
  }
}

fn check_conditioning_overload(
  view: &SessionView,
  _context: &AthleteContext,
  rules: &RuleSet,
) -> Vec<ValidationFinding> {
  let blocks: Vec<&ClassifiedEntry> = view
    .working()
    .filter(|e| e.pattern == MovementPattern::Conditioning)
    .collect();
  if blocks.len() <= rules.limits.max_conditioning_blocks {
    return vec![];
  }
  vec![ValidationFinding::blocking(
    "conditioning_overload",
    format!(
      "{} conditioning blocks, maximum is {}",
      blocks.len(),
      rules.limits.max_conditioning_blocks
    ),
    "Merge conditioning into one or two focused blocks",
  )
  .at(blocks[blocks.len() - 1].index)]
}

fn check_maximum_duration(view: &SessionView, _context: &AthleteContext, _rules: &RuleSet) -> Vec<ValidationFinding> {
  view
    .working()
    .filter_map(|e| {
      let max = e.fixed?.max_duration_seconds?;
      let seconds = e.reps.seconds()?;
      if seconds >= max.saturating_mul(2) {
        Some(
          ValidationFinding::blocking(
            "duration_exceeds_maximum",
            format!("'{}' held for {}s, more than twice the {}s maximum", e.name(), seconds, max),
            format!("Hold for {}s or less", max),
          )
          .at(e.index),
        )
      } else if seconds > max {
        Some(
          ValidationFinding::warning(
            "duration_above_recommended",
            format!("'{}' held for {}s, recommended maximum is {}s", e.name(), seconds, max),
          )
          .with_fix(format!("Hold for {}s or less", max))
          .at(e.index),
        )
      } else {
        None
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Advisory Checks
/// ---------------------------------------------------------------------------

fn check_exercise_count(view: &SessionView, _context: &AthleteContext, rules: &RuleSet) -> Vec<ValidationFinding> {
  let count = view.working().count();
  let limits = &rules.limits;
  if count < limits.main_exercises_min {
    vec![ValidationFinding::warning(
      "exercise_count_low",
      format!("Only {} main exercises (recommended {}-{})", count, limits.main_exercises_min, limits.main_exercises_max),
    )]
  } else if count > limits.main_exercises_max {
    vec![ValidationFinding::warning(
      "exercise_count_high",
      format!("{} main exercises (recommended {}-{})", count, limits.main_exercises_min, limits.main_exercises_max),
    )
    .with_fix("Drop the lowest-priority accessories")]
  } else {
    vec![]
  }
}

fn check_session_duration(view: &SessionView, _context: &AthleteContext, rules: &RuleSet) -> Vec<ValidationFinding> {
  let minutes = view.session.estimated_minutes();
  let limits = &rules.limits;
  if minutes > limits.duration_split_minutes {
    vec![ValidationFinding::warning(
      "session_duration_split",
      format!("Estimated {} minutes; sessions over {} minutes lose quality", minutes, limits.duration_split_minutes),
    )
    .with_fix("Split into two sessions")]
  } else if minutes > limits.duration_warning_minutes {
    vec![ValidationFinding::warning(
      "session_duration_long",
      format!("Estimated {} minutes (recommended {} or less)", minutes, limits.duration_warning_minutes),
    )]
  } else {
    vec![]
  }
}

fn check_strength_exercise_count(
  view: &SessionView,
  _context: &AthleteContext,
  rules: &RuleSet,
) -> Vec<ValidationFinding> {
  let count = strength_entries(view).count();
  if count > rules.limits.max_strength_exercises {
    vec![ValidationFinding::warning(
      "too_many_strength_exercises",
      format!("{} strength exercises (recommended {} or fewer)", count, rules.limits.max_strength_exercises),
    )]
  } else {
    vec![]
  }
}

fn check_pattern_skew(view: &SessionView, _context: &AthleteContext, rules: &RuleSet) -> Vec<ValidationFinding> {
  let total = view.working_sets();
  if total == 0 || view.working().count() < 3 {
    return vec![];
  }
  let mut per_pattern: BTreeMap<MovementPattern, u32> = BTreeMap::new();
  for entry in view.working().filter(|e| e.pattern != MovementPattern::Unknown) {
    let sets = per_pattern.entry(entry.pattern).or_default();
    *sets = sets.saturating_add(entry.sets());
  }
  per_pattern
    .into_iter()
    .filter(|(_, sets)| *sets as f64 / total as f64 > rules.limits.skew_share)
    .map(|(pattern, sets)| {
      ValidationFinding::warning(
        "pattern_skew",
        format!(
          "{} holds {} of {} working sets",
          pattern.as_str().replace('_', " "),
          sets,
          total
        ),
      )
      .with_fix("Spread volume across more movement patterns")
    })
    .collect()
}

fn check_round_based_counts(view: &SessionView, _context: &AthleteContext, _rules: &RuleSet) -> Vec<ValidationFinding> {
  view
    .working()
    .filter(|e| e.is_round_based() && e.reps.is_count())
    .map(|e| {
      ValidationFinding::warning(
        "round_based_count_reps",
        format!("'{}' is round-based but prescribed as '{}' reps", e.name(), e.entry.reps),
      )
      .with_fix("Prescribe rounds by time, e.g. 3 minutes")
      .at(e.index)
    })
    .collect()
}
