use crate::fixed_params::FixedParams;
use crate::models::ExerciseEntry;
use crate::prescription::{find_name_token, minutes_label, NameToken, RepsSpec};

use super::{Correction, CorrectionPass, PassContext};

/// Largest set count trusted from a timed, seconds or circuit token
const MAX_TIMED_SETS: u32 = 12;
/// Largest set count trusted from a plain reps token
const MAX_REP_SETS: u32 = 10;
/// Sets assumed when an entry carries none
pub(super) const DEFAULT_SETS: u32 = 3;

// ---------------------------------------------------------------------------
/// Token Reading
// ---------------------------------------------------------------------------

/// Reps text a name token prescribes; circuits carry none
pub(super) fn token_reps(token: &NameToken) -> Option<String> {
    match token {
        NameToken::TimedSets { minutes, .. } if *minutes > 0 => Some(minutes_label(*minutes)),
        NameToken::SecondSets { seconds, .. } if *seconds > 0 => Some(format!("{} sec", seconds)),
        NameToken::RepSets { reps, .. } if !reps.is_empty() => Some(reps.clone()),
        _ => None,
    }
}

pub(super) fn sets_plausible(token: &NameToken) -> bool {
    let cap = match token {
        NameToken::RepSets { .. } => MAX_REP_SETS,
        _ => MAX_TIMED_SETS,
    };
    (1..=cap).contains(&token.sets())
}

/// Whether the token's reps may overwrite the entry's. A token that breaks
/// the pattern's unit or maximum is rewritten by the fixed-parameter pass
/// instead.
pub(super) fn reps_allowed(token: &NameToken, fixed: Option<&FixedParams>) -> bool {
    let (Some(fixed), Some(reps)) = (fixed, token_reps(token)) else {
        return true;
    };
    let spec = RepsSpec::parse(&reps);
    !(fixed.never_duration() && spec.is_duration())
        && !(fixed.round_based() && !spec.is_duration())
        && !fixed.exceeds_max_duration(&spec)
}

/// Write the name token's values into the fields; returns what changed
fn apply_token(entry: &mut ExerciseEntry, fixed: Option<&FixedParams>) -> Vec<String> {
    let mut changes = Vec::new();
    let Some(found) = find_name_token(&entry.name) else {
        return changes;
    };
    let token = found.token;

    if sets_plausible(&token) && entry.sets != Some(token.sets()) {
        let before = entry.sets.map_or_else(|| "-".to_string(), |s| s.to_string());
        changes.push(format!("sets {} -> {}", before, token.sets()));
        entry.sets = Some(token.sets());
    }

    if let Some(reps) = token_reps(&token) {
        // Compare parsed values so "3 min" and "3 minutes" agree
        if reps_allowed(&token, fixed) && RepsSpec::parse(&reps) != entry.reps_spec() {
            changes.push(format!("reps '{}' -> '{}'", entry.reps, reps));
            entry.reps = reps;
        }
    }
    changes
}

/// The entry as it will read once its name token has been applied
pub(super) fn synced(entry: &ExerciseEntry, fixed: Option<&FixedParams>) -> ExerciseEntry {
    let mut synced = entry.clone();
    apply_token(&mut synced, fixed);
    synced
}

/// Sets the entry will end up with
pub(super) fn effective_sets(entry: &ExerciseEntry, fixed: Option<&FixedParams>) -> u32 {
    synced(entry, fixed).sets.filter(|s| *s > 0).unwrap_or(DEFAULT_SETS)
}

// ---------------------------------------------------------------------------
/// Pass
// ---------------------------------------------------------------------------

/// Make `sets`/`reps` agree with the "NxM" token in the name
pub(super) fn sync_names(out: &mut Correction, cx: &PassContext<'_>) {
    for index in 0..out.session.exercises.len() {
        let entry = &out.session.exercises[index];
        if !entry.has_name() {
            continue;
        }
        let fixed = cx.fixed(entry);
        let name = entry.name.clone();
        let changes = apply_token(&mut out.session.exercises[index], fixed);
        if !changes.is_empty() {
            out.note(CorrectionPass::Sync, Some(index), format!("'{}': {}", name, changes.join(", ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_params::RepUnit;
    use crate::models::ExerciseType;
    use crate::test_utils::entry;
    use pretty_assertions::assert_eq;

    fn round_based() -> FixedParams {
        FixedParams {
            unit: RepUnit::Duration,
            canonical_reps: Some("3 minutes".into()),
            ..Default::default()
        }
    }

    fn count_only() -> FixedParams {
        FixedParams {
            unit: RepUnit::Count,
            canonical_reps: Some("15-20".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_timed_token_overrides_fields() {
        // Arrange
        let bag = entry("Heavy Bag: 6x3min", 3, "3", ExerciseType::Conditioning);

        // Act
        let result = synced(&bag, Some(&round_based()));

        // Assert
        assert_eq!(result.sets, Some(6));
        assert_eq!(result.reps, "3 minutes");
    }

    #[test]
    fn test_equivalent_reps_are_left_alone() {
        let bag = entry("Heavy Bag: 5x3min", 5, "3 min", ExerciseType::Conditioning);
        assert_eq!(synced(&bag, Some(&round_based())), bag);
    }

    #[test]
    fn test_duration_token_on_count_pattern_keeps_reps() {
        // Arrange
        let neck = entry("Neck Extension 3x45s", 2, "15", ExerciseType::Hypertrophy);

        // Act
        let result = synced(&neck, Some(&count_only()));

        // Assert
        assert_eq!(result.sets, Some(3));
        assert_eq!(result.reps, "15");
    }

    #[test]
    fn test_implausible_set_counts_are_ignored() {
        // Arrange
        let sprints = entry("Sprints 30x10", 4, "10", ExerciseType::Conditioning);

        // Act / Assert
        assert_eq!(effective_sets(&sprints, None), 4);
    }

    #[test]
    fn test_circuit_token_sets_only() {
        // Arrange
        let metcon = entry("MetCon: 4x (10 Burpees + 15 KB Swings)", 3, "", ExerciseType::Conditioning);

        // Act
        let result = synced(&metcon, None);

        // Assert
        assert_eq!(result.sets, Some(4));
        assert_eq!(result.reps, "");
    }
}
