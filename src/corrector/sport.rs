use crate::classifier::normalize_name;
use crate::models::{ExerciseEntry, ExerciseType, Session};
use crate::rules::{InsertPosition, RequirementMinimum, SportRequirement};

use super::sync::effective_sets;
use super::{Correction, CorrectionPass, PassContext};

fn matches(entry: &ExerciseEntry, requirement: &SportRequirement, cx: &PassContext<'_>) -> bool {
    if !cx.is_working(entry) {
        return false;
    }
    if requirement.patterns.contains(&cx.pattern(entry)) {
        return true;
    }
    let name = normalize_name(&entry.name);
    requirement
        .keywords
        .iter()
        .any(|k| name.contains(normalize_name(k).as_str()))
}

fn satisfied(requirement: &SportRequirement, session: &Session, cx: &PassContext<'_>) -> bool {
    let matching: Vec<&ExerciseEntry> = session
        .exercises
        .iter()
        .filter(|e| matches(e, requirement, cx))
        .collect();
    let limits = &cx.rules.limits;

    match requirement.minimum {
        RequirementMinimum::Present => !matching.is_empty(),
        RequirementMinimum::Rounds => {
            let rounds = matching
                .iter()
                .map(|e| effective_sets(e, cx.fixed(e)))
                .fold(0u32, u32::saturating_add);
            rounds >= limits.boxing_min_rounds
        }
        RequirementMinimum::NeckDirections => {
            limits.neck_direction_count(matching.iter().map(|e| e.name.as_str())) >= limits.neck_min_directions
        }
    }
}

/// Index of the closing cool-down, or the end of the session
fn before_cooldown(session: &Session, cx: &PassContext<'_>) -> usize {
    session
        .exercises
        .iter()
        .rposition(|e| e.has_name())
        .filter(|&i| cx.is_cooldown(&session.exercises[i]))
        .unwrap_or(session.exercises.len())
}

fn insertion_index(position: InsertPosition, session: &Session, cx: &PassContext<'_>) -> usize {
    match position {
        InsertPosition::AfterFirstStrength => session
            .exercises
            .iter()
            .position(|e| cx.is_working(e) && e.exercise_type == ExerciseType::Strength)
            .map(|i| i + 1)
            .unwrap_or_else(|| before_cooldown(session, cx)),
        InsertPosition::BeforeCooldown => before_cooldown(session, cx),
    }
}

/// Insert the sport's mandatory elements when the session lacks them
pub(super) fn insert_requirements(out: &mut Correction, cx: &PassContext<'_>) {
    let key = cx.sport.key();
    for requirement in cx.rules.requirements_for(key) {
        if requirement.skip_low_intensity && cx.low_intensity {
            continue;
        }
        if satisfied(requirement, &out.session, cx) {
            continue;
        }
        let index = insertion_index(requirement.position, &out.session, cx);
        let entry = requirement.entry.to_entry();
        let message = format!("Inserted '{}' for {} requirement '{}'", entry.name, key, requirement.id);
        out.session.exercises.insert(index, entry);
        out.note(CorrectionPass::SportInsertion, Some(index), message);
    }
}
