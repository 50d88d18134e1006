use crate::models::{ExerciseEntry, ExerciseType};
use crate::prescription::{find_name_token, minutes_label, name_distance_meters, name_minutes};

use super::sync::{reps_allowed, sets_plausible, token_reps, DEFAULT_SETS};
use super::{Correction, CorrectionPass, PassContext};

/// Reps for an entry whose type is all there is to go on
fn type_default(exercise_type: ExerciseType) -> String {
    match exercise_type {
        ExerciseType::Strength => "5".into(),
        ExerciseType::Hypertrophy => "8-12".into(),
        ExerciseType::Power => "3-5".into(),
        ExerciseType::Conditioning => "45 sec".into(),
        ExerciseType::Technique => minutes_label(3),
        ExerciseType::Warmup => "10 min".into(),
        ExerciseType::Cooldown => "8 min".into(),
        ExerciseType::Unknown => "10".into(),
    }
}

/// First source that yields reps: name token, minutes or distance in the
/// name, the pattern's canonical value, the structural template, the type
fn infer_reps(entry: &ExerciseEntry, cx: &PassContext<'_>) -> String {
    let fixed = cx.fixed(entry);

    if let Some(reps) = find_name_token(&entry.name)
        .filter(|found| reps_allowed(&found.token, fixed))
        .and_then(|found| token_reps(&found.token))
    {
        return reps;
    }
    if let Some(minutes) = name_minutes(&entry.name).filter(|m| *m > 0) {
        if !fixed.is_some_and(|f| f.never_duration()) {
            return minutes_label(minutes);
        }
    }
    if let Some(meters) = name_distance_meters(&entry.name) {
        if !fixed.is_some_and(|f| f.round_based()) {
            return format!("{}m", meters);
        }
    }
    if let Some(canonical) = fixed.and_then(|f| f.canonical_reps.clone()) {
        return canonical;
    }
    if cx.is_warmup(entry) {
        return cx.rules.structure.warmup.reps.clone();
    }
    if cx.is_cooldown(entry) {
        return cx.rules.structure.cooldown.reps.clone();
    }
    type_default(entry.exercise_type)
}

/// Fill missing sets and reps so every entry carries a complete prescription
pub(super) fn infer_missing_fields(out: &mut Correction, cx: &PassContext<'_>) {
    for index in 0..out.session.exercises.len() {
        let original = &out.session.exercises[index];
        let mut entry = original.clone();
        let mut changes = Vec::new();

        // "4x3 min" written into the reps field
        if let Some(found) = find_name_token(&entry.reps).filter(|f| sets_plausible(&f.token)) {
            if let Some(reps) = token_reps(&found.token) {
                changes.push(format!("split reps '{}' into {} sets of '{}'", entry.reps, found.token.sets(), reps));
                entry.sets = Some(found.token.sets());
                entry.reps = reps;
            }
        }

        if entry.sets.map_or(true, |s| s == 0) {
            changes.push(format!("sets -> {}", DEFAULT_SETS));
            entry.sets = Some(DEFAULT_SETS);
        }

        if entry.reps_spec().needs_inference() {
            let reps = infer_reps(&entry, cx);
            changes.push(format!("reps '{}' -> '{}'", entry.reps, reps));
            entry.reps = reps;
        }

        if changes.is_empty() {
            continue;
        }
        let label = if entry.has_name() {
            format!("'{}'", entry.name)
        } else {
            "Unnamed entry".to_string()
        };
        out.session.exercises[index] = entry;
        out.note(CorrectionPass::Fields, Some(index), format!("{}: {}", label, changes.join(", ")));
    }
}
