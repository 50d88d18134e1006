use crate::models::{ExerciseEntry, ExerciseType};
use crate::prescription::{find_name_token, NameToken};

use super::sync::synced;
use super::{Correction, CorrectionPass, PassContext};

pub(super) fn complete_structure(out: &mut Correction, cx: &PassContext<'_>) {
    consolidate_warmups(out, cx);
    enforce_warmup_minimum(out, cx);
    ensure_warmup_first(out, cx);
    ensure_cooldown_last(out, cx);
}

/// Merge several opening warm-up entries into one
pub(super) fn consolidate_warmups(out: &mut Correction, cx: &PassContext<'_>) {
    let structure = &cx.rules.structure;
    let warmups: Vec<usize> = out
        .session
        .exercises
        .iter()
        .enumerate()
        .take_while(|(_, e)| !e.has_name() || cx.is_warmup(e))
        .filter(|(_, e)| e.has_name())
        .map(|(i, _)| i)
        .collect();
    if warmups.len() < 2 {
        return;
    }

    let names: Vec<String> = warmups
        .iter()
        .map(|&i| out.session.exercises[i].name.clone())
        .collect();
    for &index in warmups.iter().rev() {
        out.session.exercises.remove(index);
    }

    let merged = ExerciseEntry {
        name: structure.consolidated_warmup_name.clone(),
        sets: Some(1),
        reps: structure.consolidated_warmup_reps.clone(),
        rest: None,
        exercise_type: ExerciseType::Warmup,
        notes: Some(format!("Combines: {}", names.join("; "))),
    };
    let at = warmups[0];
    out.session.exercises.insert(at, merged);
    out.note(
        CorrectionPass::Structure,
        Some(at),
        format!("Merged {} warm-up entries into '{}'", names.len(), structure.consolidated_warmup_name),
    );
}

/// Raise a too-short opening warm-up to the minimum
fn enforce_warmup_minimum(out: &mut Correction, cx: &PassContext<'_>) {
    let Some(index) = out.session.exercises.iter().position(|e| e.has_name()) else {
        return;
    };
    let entry = &out.session.exercises[index];
    if !cx.is_warmup(entry) {
        return;
    }
    let minutes = synced(entry, cx.fixed(entry)).prescribed_minutes();
    if minutes >= cx.rules.limits.min_warmup_minutes {
        return;
    }

    let reps = cx.rules.structure.minimum_warmup_reps.clone();
    let mut raised = entry.clone();
    raised.sets = Some(1);
    if let Some(found) = find_name_token(&raised.name) {
        raised.name = found.replace_in(&raised.name, &NameToken::for_reps(1, &reps));
    }
    raised.reps = reps;

    let message = format!("'{}' lasted {:.0} min, raised to '{}'", entry.name, minutes, raised.reps);
    out.session.exercises[index] = raised;
    out.note(CorrectionPass::Structure, Some(index), message);
}

fn ensure_warmup_first(out: &mut Correction, cx: &PassContext<'_>) {
    let has_warmup = out
        .session
        .exercises
        .iter()
        .find(|e| e.has_name())
        .is_some_and(|e| cx.is_warmup(e));
    if has_warmup {
        return;
    }
    let warmup = cx.rules.structure.warmup.to_entry();
    let message = format!("Added warm-up '{}'", warmup.name);
    out.session.exercises.insert(0, warmup);
    out.note(CorrectionPass::Structure, Some(0), message);
}

fn ensure_cooldown_last(out: &mut Correction, cx: &PassContext<'_>) {
    let has_cooldown = out
        .session
        .exercises
        .iter()
        .rev()
        .find(|e| e.has_name())
        .is_some_and(|e| cx.is_cooldown(e));
    if has_cooldown {
        return;
    }
    let cooldown = cx.rules.structure.cooldown.to_entry();
    let message = format!("Added cool-down '{}'", cooldown.name);
    out.session.exercises.push(cooldown);
    let at = out.session.exercises.len() - 1;
    out.note(CorrectionPass::Structure, Some(at), message);
}
