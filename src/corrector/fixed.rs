use crate::fixed_params::FixedParams;
use crate::models::{ExerciseEntry, ExerciseType};
use crate::prescription::{find_name_token, rest_label, superset_role, NameToken, RepsSpec, SupersetRole};

use super::sync::{reps_allowed, synced};
use super::{Correction, CorrectionPass, PassContext};

/// Reps that satisfy the maximum duration
fn within_maximum(fixed: &FixedParams, max: u32) -> String {
    fixed
        .canonical_reps
        .clone()
        .filter(|c| RepsSpec::parse(c).seconds().is_some_and(|s| s <= max))
        .unwrap_or_else(|| format!("{} sec", max))
}

/// Token carrying the entry's current reps, for names whose token disagrees
fn token_for(sets: u32, reps: &str) -> Option<NameToken> {
    match RepsSpec::parse(reps) {
        RepsSpec::Duration { .. } => Some(NameToken::for_reps(sets, reps)),
        RepsSpec::Count { low, high } if low == high => Some(NameToken::RepSets {
            sets,
            reps: low.to_string(),
        }),
        RepsSpec::Count { low, high } => Some(NameToken::RepSets {
            sets,
            reps: format!("{}-{}", low, high),
        }),
        _ => None,
    }
}

fn apply_table(entry: &mut ExerciseEntry, fixed: &FixedParams, clamp_rest: bool, changes: &mut Vec<String>) {
    let mut set_reps = |entry: &mut ExerciseEntry, reps: String, why: &str| {
        changes.push(format!("reps '{}' -> '{}' ({})", entry.reps, reps, why));
        entry.reps = reps;
    };

    let spec = entry.reps_spec();
    if fixed.duration_on_count_pattern(&spec) {
        set_reps(entry, fixed.count_reps(), "never duration-based");
    } else if fixed.round_based() && !spec.is_duration() {
        let reps = fixed.round_reps(&spec, &entry.reps);
        set_reps(entry, reps, "round-based");
    }

    let spec = entry.reps_spec();
    if let Some(max) = fixed.max_duration_seconds.filter(|_| fixed.exceeds_max_duration(&spec)) {
        set_reps(entry, within_maximum(fixed, max), "above maximum duration");
    }

    if !clamp_rest {
        return;
    }
    if let Some(min) = fixed.min_rest_seconds.filter(|_| fixed.rest_below_minimum(entry.rest_seconds())) {
        changes.push(format!("rest '{}' -> '{}'", entry.rest.as_deref().unwrap_or_default(), rest_label(min)));
        entry.rest = Some(rest_label(min));
    }

    if fixed.round_based() && entry.rest.is_none() {
        if let Some(rest) = fixed.default_rest.clone() {
            changes.push(format!("rest -> '{}'", rest));
            entry.rest = Some(rest);
        }
    }
}

/// Superset rest: the lead goes straight into its partner, the follower
/// carries the recovery for the pair
fn apply_superset_rest(entry: &mut ExerciseEntry, role: SupersetRole, cx: &PassContext<'_>, changes: &mut Vec<String>) {
    let rules = &cx.rules.superset_rest;
    let rest = entry.rest_seconds();
    let target = match role {
        SupersetRole::Lead if rest.map_or(true, |r| r > rules.lead_max_rest_seconds) => rules.lead_rest_seconds,
        SupersetRole::Follow if rest.map_or(true, |r| r < rules.follow_min_rest_seconds) => rules.follow_rest_seconds,
        _ => return,
    };
    let label = rest_label(target);
    changes.push(format!(
        "rest '{}' -> '{}' (superset {})",
        entry.rest.as_deref().unwrap_or_default(),
        label,
        if role == SupersetRole::Lead { "lead" } else { "follower" }
    ));
    entry.rest = Some(label);
}

/// Enforce the fixed-parameter table, superset rest and the low-rep
/// strength rest guide on working entries
pub(super) fn enforce_fixed_parameters(out: &mut Correction, cx: &PassContext<'_>) {
    for index in 0..out.session.exercises.len() {
        let original = &out.session.exercises[index];
        if !cx.is_working(original) {
            continue;
        }
        let fixed = cx.fixed(original);
        let compound = cx.is_compound(original);
        let superset = superset_role(&original.name);
        let lead = superset == Some(SupersetRole::Lead);
        let mut entry = original.clone();
        let mut changes = Vec::new();

        if let Some(fixed) = fixed {
            apply_table(&mut entry, fixed, !lead, &mut changes);
        }

        if entry.exercise_type == ExerciseType::Strength && compound && !lead {
            let reps = synced(&entry, fixed).reps_spec().max_count();
            if let Some(min) = reps.and_then(|r| cx.rules.strength_rest.minimum_for(r)) {
                if entry.rest_seconds().map_or(true, |rest| rest < min) {
                    changes.push(format!(
                        "rest '{}' -> '{}' (low-rep strength)",
                        entry.rest.as_deref().unwrap_or_default(),
                        rest_label(min)
                    ));
                    entry.rest = Some(rest_label(min));
                }
            }
        }

        if let Some(role) = superset {
            apply_superset_rest(&mut entry, role, cx, &mut changes);
        }

        if let Some(found) = find_name_token(&entry.name) {
            if fixed.is_some() && !reps_allowed(&found.token, fixed) {
                if let Some(token) = token_for(found.token.sets(), &entry.reps) {
                    changes.push(format!("name token '{}' -> '{}'", found.token.render(), token.render()));
                    entry.name = found.replace_in(&entry.name, &token);
                }
            }
        }

        if changes.is_empty() {
            continue;
        }
        let message = format!("'{}': {}", out.session.exercises[index].name, changes.join(", "));
        out.session.exercises[index] = entry;
        out.note(CorrectionPass::FixedParameters, Some(index), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PatternClassifier;
    use crate::corrector::NamingPatterns;
    use crate::models::{AthleteContext, Session, Sport};
    use crate::rules::RuleSet;
    use crate::test_utils::{entry, session_of};
    use pretty_assertions::assert_eq;

    fn enforce(session: Session) -> Correction {
        let rules = RuleSet::default();
        let classifier = PatternClassifier::from_rules(&rules).unwrap();
        let naming = NamingPatterns::compile(&rules.naming).unwrap();
        let context = AthleteContext::default();
        let cx = PassContext {
            rules: &rules,
            classifier: &classifier,
            naming: &naming,
            athlete: &context,
            sport: Sport::General,
            low_intensity: false,
        };
        let mut out = Correction::new(session);
        enforce_fixed_parameters(&mut out, &cx);
        out
    }

    #[test]
    fn test_timed_neck_work_becomes_reps() {
        // Arrange
        let session = session_of(vec![
            entry("Neck Extension 3x45s", 3, "45 sec", ExerciseType::Hypertrophy).with_rest("30s"),
        ]);

        // Act
        let out = enforce(session);

        // Assert
        let neck = &out.session.exercises[0];
        assert_eq!(neck.reps, "15-20");
        assert_eq!(neck.name, "Neck Extension 3x15-20");
    }

    #[test]
    fn test_bare_number_on_bag_work_reads_as_minutes() {
        // Arrange
        let session = session_of(vec![entry("Heavy Bag", 5, "3", ExerciseType::Conditioning)]);

        // Act
        let out = enforce(session);

        // Assert
        let bag = &out.session.exercises[0];
        assert_eq!(bag.reps, "3 minutes");
        assert_eq!(bag.rest.as_deref(), Some("60s"));
    }

    #[test]
    fn test_plank_is_capped_at_maximum() {
        // Arrange
        let session = session_of(vec![entry("Plank", 3, "2 min", ExerciseType::Hypertrophy)]);

        // Act
        let out = enforce(session);

        // Assert
        assert_eq!(out.session.exercises[0].reps, "45 sec");
    }

    #[test]
    fn test_plyometric_rest_is_raised() {
        // Arrange
        let session = session_of(vec![entry("Box Jumps", 4, "5", ExerciseType::Power).with_rest("30s")]);

        // Act
        let out = enforce(session);

        // Assert
        assert_eq!(out.session.exercises[0].rest.as_deref(), Some("90s"));
    }

    #[test]
    fn test_low_rep_compound_strength_gets_full_rest() {
        // Arrange
        let session = session_of(vec![
            entry("Back Squat", 5, "3", ExerciseType::Strength).with_rest("60s"),
            entry("Bench Press", 4, "5", ExerciseType::Strength),
            entry("Barbell Row", 4, "8", ExerciseType::Strength).with_rest("60s"),
        ]);

        // Act
        let out = enforce(session);

        // Assert
        let rests: Vec<Option<&str>> = out.session.exercises.iter().map(|e| e.rest.as_deref()).collect();
        assert_eq!(rests, vec![Some("180s"), Some("150s"), Some("60s")]);
    }

    #[test]
    fn test_superset_lead_goes_straight_to_partner() {
        // Arrange
        let session = session_of(vec![
            entry("A1: Bench Press", 4, "5", ExerciseType::Strength).with_rest("90s"),
            entry("A2: Chest Supported Row", 4, "8", ExerciseType::Hypertrophy).with_rest("60s"),
            entry("B1) Box Jumps", 3, "5", ExerciseType::Power),
            entry("B2) Split Squat", 3, "8", ExerciseType::Hypertrophy).with_rest("2 min"),
        ]);

        // Act
        let out = enforce(session);

        // Assert
        let rests: Vec<Option<&str>> = out.session.exercises.iter().map(|e| e.rest.as_deref()).collect();
        assert_eq!(rests, vec![Some("0s"), Some("120s"), Some("0s"), Some("2 min")]);
    }

    #[test]
    fn test_short_superset_lead_rest_is_kept() {
        // Arrange
        let session = session_of(vec![
            entry("Pull-up (Superset A1)", 3, "8", ExerciseType::Hypertrophy).with_rest("20s"),
        ]);

        // Act
        let out = enforce(session.clone());

        // Assert
        assert_eq!(out.session, session);
        assert!(out.notes.is_empty());
    }

    #[test]
    fn test_warmups_are_exempt() {
        // Arrange
        let session = session_of(vec![entry("Dynamic Warm-up: Plank 2 min", 1, "2 min", ExerciseType::Warmup)]);

        // Act
        let out = enforce(session.clone());

        // Assert
        assert_eq!(out.session, session);
    }
}
