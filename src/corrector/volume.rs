use crate::classifier::normalize_name;
use crate::models::{ExerciseEntry, ExerciseType, ExperienceLevel, Phase, ScalingPass};
use crate::prescription::{count_label, find_name_token, NameToken};
use crate::rules::RoundCap;

use super::sync::{effective_sets, sets_plausible, synced};
use super::{Correction, CorrectionPass, PassContext};

// ---------------------------------------------------------------------------
/// Shared Helpers
// ---------------------------------------------------------------------------

/// Lowest set count scaling may leave on an entry
fn floor_for(entry: &ExerciseEntry, cx: &PassContext<'_>) -> u32 {
    let floors = &cx.rules.volume.floors;
    let pattern = cx.pattern(entry);
    if cx.is_compound(entry) {
        floors.compound
    } else if cx.fixed(entry).is_some_and(|f| f.round_based()) {
        floors.round_based
    } else if pattern.is_isolation() {
        floors.accessory
    } else {
        floors.other
    }
}

/// Write new sets, and optionally reps, into the fields and the name token
fn rewrite_volume(entry: &mut ExerciseEntry, sets: u32, reps: Option<&str>) {
    entry.sets = Some(sets);
    if let Some(reps) = reps {
        entry.reps = reps.to_string();
    }
    let Some(found) = find_name_token(&entry.name) else {
        return;
    };
    let mut token = if sets_plausible(&found.token) {
        found.token.with_sets(sets)
    } else {
        found.token.clone()
    };
    if let (Some(reps), NameToken::RepSets { sets, .. }) = (reps, &token) {
        token = NameToken::RepSets {
            sets: *sets,
            reps: count_label(reps),
        };
    }
    if token != found.token {
        entry.name = found.replace_in(&entry.name, &token);
    }
}

/// Scale one working entry to `target` sets, clamped between its floor and
/// its current value
fn scale_entry(out: &mut Correction, cx: &PassContext<'_>, pass: CorrectionPass, index: usize, target: u32, reps: Option<&str>) {
    let entry = &out.session.exercises[index];
    let base = effective_sets(entry, cx.fixed(entry));
    let sets = target.max(floor_for(entry, cx)).min(base);
    if sets == base && reps.is_none() {
        return;
    }

    let name = entry.name.clone();
    rewrite_volume(&mut out.session.exercises[index], sets, reps);
    let message = match reps {
        Some(reps) => format!("'{}': {} -> {} sets, reps -> '{}'", name, base, sets, reps),
        None => format!("'{}': {} -> {} sets", name, base, sets),
    };
    out.note(pass, Some(index), message);
}

fn working_indices(out: &Correction, cx: &PassContext<'_>) -> Vec<usize> {
    (0..out.session.exercises.len())
        .filter(|&i| cx.is_working(&out.session.exercises[i]))
        .collect()
}

// ---------------------------------------------------------------------------
/// Pre-scaling: periodization, experience and compliance
// ---------------------------------------------------------------------------

pub(super) fn pre_scale(out: &mut Correction, cx: &PassContext<'_>) {
    let rules = &cx.rules.volume;
    let periodization = cx.athlete.periodization.as_ref();
    let beginner = cx.athlete.level == ExperienceLevel::Beginner;
    let low_compliance = cx
        .athlete
        .effective_compliance()
        .is_some_and(|c| c < rules.low_compliance_pct);

    if periodization.is_none() && !beginner && !low_compliance {
        return;
    }
    if out.session.scaled_by(ScalingPass::PreScaling) {
        return;
    }

    let mut reasons = Vec::new();
    if periodization.is_some() {
        reasons.push("periodization");
    }
    if beginner {
        reasons.push("beginner");
    }
    if low_compliance {
        reasons.push("low compliance");
    }

    for index in working_indices(out, cx) {
        let entry = &out.session.exercises[index];
        let fixed = cx.fixed(entry);
        let mut target = effective_sets(entry, fixed);
        let mut reps = None;

        if let Some(params) = periodization {
            if params.is_recovery() {
                target = target.min(rules.recovery_set_cap);
            }
            if let Some(pct) = params.volume_pct.filter(|v| *v < 100.0) {
                target = (f64::from(target) * pct.max(0.0) / 100.0).round() as u32;
            }
            let high_intensity = params.intensity_pct.is_some_and(|i| i >= rules.high_intensity_pct);
            let high_reps = synced(entry, fixed)
                .reps_spec()
                .max_count()
                .is_some_and(|r| r >= rules.high_intensity_rep_floor);
            if high_intensity && high_reps && entry.exercise_type == ExerciseType::Strength {
                reps = Some(rules.high_intensity_reps.as_str());
            }
        }

        if beginner || low_compliance {
            if target >= rules.halve_from_sets {
                target = (f64::from(target) * 0.5).ceil() as u32;
            } else if target >= rules.reduce_from_sets {
                target = (f64::from(target) * rules.reduce_factor).ceil() as u32;
            }
        }

        scale_entry(out, cx, CorrectionPass::PreScaling, index, target, reps);
    }

    out.session.stamp_scaling(ScalingPass::PreScaling, reasons.join(", "));
}

// ---------------------------------------------------------------------------
/// Phase Scaling: deload and accumulation
// ---------------------------------------------------------------------------

pub(super) fn phase_scale(out: &mut Correction, cx: &PassContext<'_>) {
    let accumulation = cx.athlete.effective_phase() == Some(Phase::Accumulation);
    if !cx.low_intensity && !accumulation {
        return;
    }
    if out.session.scaled_by(ScalingPass::PhaseScaling) {
        return;
    }

    if cx.low_intensity {
        reduce_for_low_intensity(out, cx);
        cap_exercise_count(out, cx);
    }
    if accumulation {
        trim_long_conditioning(out, cx);
    }

    let reason = if cx.low_intensity { "low intensity" } else { "accumulation" };
    out.session.stamp_scaling(ScalingPass::PhaseScaling, reason);
}

fn reduce_for_low_intensity(out: &mut Correction, cx: &PassContext<'_>) {
    let factor = 1.0 - cx.rules.volume.deload_reduction_pct.clamp(0.0, 100.0) / 100.0;
    for index in working_indices(out, cx) {
        let entry = &out.session.exercises[index];
        let base = effective_sets(entry, cx.fixed(entry));
        let target = (f64::from(base) * factor).round() as u32;
        scale_entry(out, cx, CorrectionPass::PhaseScaling, index, target, None);
    }
}

/// Drop entries past the cap, keeping the opening warm-up and closing cool-down
fn cap_exercise_count(out: &mut Correction, cx: &PassContext<'_>) {
    let cap = cx.rules.volume.low_intensity_exercise_cap;
    let exercises = &out.session.exercises;
    if exercises.len() <= cap {
        return;
    }

    let first_named = exercises.iter().position(|e| e.has_name());
    let last_named = exercises.iter().rposition(|e| e.has_name());
    let warmup = first_named.filter(|&i| cx.is_warmup(&exercises[i]));
    let cooldown = last_named.filter(|&i| cx.is_cooldown(&exercises[i]));
    let reserved = [warmup, cooldown].iter().flatten().count();
    let mut room = cap.saturating_sub(reserved);

    let mut dropped = Vec::new();
    let mut kept = Vec::with_capacity(cap);
    for (index, entry) in exercises.iter().enumerate() {
        if Some(index) == warmup || Some(index) == cooldown {
            kept.push(entry.clone());
        } else if room > 0 {
            room -= 1;
            kept.push(entry.clone());
        } else {
            dropped.push(if entry.has_name() { entry.name.clone() } else { format!("#{}", index) });
        }
    }

    out.session.exercises = kept;
    out.note(
        CorrectionPass::PhaseScaling,
        None,
        format!("Low-intensity session capped at {} entries, dropped: {}", cap, dropped.join(", ")),
    );
}

/// Long conditioning blocks are shortened during accumulation
fn trim_long_conditioning(out: &mut Correction, cx: &PassContext<'_>) {
    let rules = &cx.rules.volume;
    for index in working_indices(out, cx) {
        let entry = &out.session.exercises[index];
        let conditioning = entry.exercise_type == ExerciseType::Conditioning
            || cx.pattern(entry) == crate::models::MovementPattern::Conditioning;
        if !conditioning {
            continue;
        }
        let current = synced(entry, cx.fixed(entry));
        let base = current.sets.filter(|s| *s > 0).unwrap_or(super::sync::DEFAULT_SETS);
        if current.prescribed_minutes() <= rules.accumulation_conditioning_minutes
            || base < rules.accumulation_conditioning_min_sets
        {
            continue;
        }
        let target = ((f64::from(base) * rules.accumulation_conditioning_factor).floor() as u32)
            .max(rules.accumulation_conditioning_floor);
        scale_entry(out, cx, CorrectionPass::PhaseScaling, index, target, None);
    }
}

// ---------------------------------------------------------------------------
/// Volume Limits: strength minimums and sport round caps
// ---------------------------------------------------------------------------

pub(super) fn enforce_limits(out: &mut Correction, cx: &PassContext<'_>) {
    if !cx.low_intensity {
        raise_strength_minimums(out, cx);
    }
    cap_rounds(out, cx);
}

fn mentions_any(name: &str, keywords: &[String]) -> bool {
    let name = normalize_name(name);
    keywords.iter().any(|k| name.contains(normalize_name(k).as_str()))
}

/// Strength work below its minimum set count is raised to it
fn raise_strength_minimums(out: &mut Correction, cx: &PassContext<'_>) {
    let minimums = &cx.rules.volume.strength_minimums;
    for index in working_indices(out, cx) {
        let entry = &out.session.exercises[index];
        let fixed = cx.fixed(entry);
        if entry.exercise_type != ExerciseType::Strength || fixed.is_some_and(|f| f.round_based()) {
            continue;
        }
        let main = mentions_any(&entry.name, &minimums.main_keywords);
        let minimum = if main { minimums.main_sets } else { minimums.accessory_sets };
        let base = effective_sets(entry, fixed);
        if base >= minimum {
            continue;
        }

        let name = entry.name.clone();
        rewrite_volume(&mut out.session.exercises[index], minimum, None);
        let kind = if main { "main lift" } else { "strength accessory" };
        out.note(
            CorrectionPass::VolumeLimits,
            Some(index),
            format!("'{}': {} -> {} sets ({} minimum)", name, base, minimum, kind),
        );
    }
}

/// Drills past their sport's round ceiling are cut back
fn cap_rounds(out: &mut Correction, cx: &PassContext<'_>) {
    let key = cx.sport.key();
    let caps: Vec<&RoundCap> = cx.rules.volume.round_caps.iter().filter(|c| c.sport == key).collect();
    if caps.is_empty() {
        return;
    }
    for index in working_indices(out, cx) {
        let entry = &out.session.exercises[index];
        let Some(cap) = caps.iter().find(|c| mentions_any(&entry.name, &c.keywords)) else {
            continue;
        };
        let rounds = effective_sets(entry, cx.fixed(entry));
        if rounds <= cap.max_rounds {
            continue;
        }

        let name = entry.name.clone();
        rewrite_volume(&mut out.session.exercises[index], cap.reduced_to, None);
        out.note(
            CorrectionPass::VolumeLimits,
            Some(index),
            format!(
                "'{}': {} -> {} rounds ({} allows at most {})",
                name, rounds, cap.reduced_to, cap.id, cap.max_rounds
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PatternClassifier;
    use crate::corrector::NamingPatterns;
    use crate::models::{AthleteContext, PeriodizationParams, Session, Sport};
    use crate::rules::RuleSet;
    use crate::test_utils::{cooldown, entry, session_of, warmup};
    use pretty_assertions::assert_eq;

    fn run(pass: fn(&mut Correction, &PassContext<'_>), session: Session, context: &AthleteContext) -> Correction {
        run_for(Sport::Gym, pass, session, context)
    }

    fn run_for(
        sport: Sport,
        pass: fn(&mut Correction, &PassContext<'_>),
        session: Session,
        context: &AthleteContext,
    ) -> Correction {
        let rules = RuleSet::default();
        let classifier = PatternClassifier::from_rules(&rules).unwrap();
        let naming = NamingPatterns::compile(&rules.naming).unwrap();
        let cx = PassContext {
            rules: &rules,
            classifier: &classifier,
            naming: &naming,
            athlete: context,
            sport,
            low_intensity: crate::classifier::is_low_intensity(&session, context, &classifier),
        };
        let mut out = Correction::new(session);
        pass(&mut out, &cx);
        out
    }

    fn sets(out: &Correction) -> Vec<Option<u32>> {
        out.session.exercises.iter().map(|e| e.sets).collect()
    }

    #[test]
    fn test_beginner_volume_is_halved_from_eight_sets() {
        // Arrange
        let context = AthleteContext {
            level: ExperienceLevel::Beginner,
            ..Default::default()
        };
        let session = session_of(vec![
            entry("Back Squat", 8, "5", ExerciseType::Strength),
            entry("Leg Extension", 5, "12", ExerciseType::Hypertrophy),
            entry("Calf Raise", 1, "15", ExerciseType::Hypertrophy),
        ]);

        // Act
        let out = run(pre_scale, session, &context);

        // Assert
        assert_eq!(sets(&out), vec![Some(4), Some(4), Some(1)]);
        assert!(out.session.scaled_by(ScalingPass::PreScaling));
    }

    #[test]
    fn test_high_intensity_rewrites_reps_and_token() {
        // Arrange
        let context = AthleteContext {
            periodization: Some(PeriodizationParams {
                intensity_pct: Some(90.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let session = session_of(vec![entry("Back Squat: 4x8-10", 4, "8-10", ExerciseType::Strength)]);

        // Act
        let out = run(pre_scale, session, &context);

        // Assert
        let squat = &out.session.exercises[0];
        assert_eq!(squat.reps, "3-5");
        assert_eq!(squat.name, "Back Squat: 4x3-5");
    }

    #[test]
    fn test_stamp_prevents_second_scaling() {
        // Arrange
        let context = AthleteContext {
            periodization: Some(PeriodizationParams {
                volume_pct: Some(50.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let session = session_of(vec![entry("Barbell Row", 6, "8", ExerciseType::Hypertrophy)]);

        // Act
        let once = run(pre_scale, session, &context);
        let twice = run(pre_scale, once.session.clone(), &context);

        // Assert
        assert_eq!(sets(&once), vec![Some(3)]);
        assert_eq!(twice.session, once.session);
        assert!(twice.notes.is_empty());
    }

    #[test]
    fn test_deload_reduction_respects_floors() {
        // Arrange
        let context = AthleteContext::default().with_phase(Phase::Deload);
        let session = session_of(vec![
            warmup(),
            entry("Back Squat", 5, "5", ExerciseType::Strength),
            entry("Heavy Bag: 2x3min", 2, "3 minutes", ExerciseType::Conditioning),
            cooldown(),
        ]);

        // Act
        let out = run(phase_scale, session, &context);

        // Assert
        assert_eq!(sets(&out), vec![Some(1), Some(4), Some(2), Some(1)]);
        assert_eq!(out.session.exercises[2].name, "Heavy Bag: 2x3min");
    }

    #[test]
    fn test_low_intensity_cap_keeps_warmup_and_cooldown() {
        // Arrange
        let mut exercises = vec![warmup()];
        for name in ["Goblet Squat", "Push-up", "Band Row", "Glute Bridge", "Dead Bug", "Bird Dog"] {
            exercises.push(entry(name, 2, "10", ExerciseType::Hypertrophy));
        }
        exercises.push(cooldown());
        let session = Session::new("Light recovery", exercises);

        // Act
        let out = run(phase_scale, session, &AthleteContext::default());

        // Assert
        let names: Vec<&str> = out.session.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Dynamic Warm-up: 10min", "Goblet Squat", "Push-up", "Band Row", "Glute Bridge", "Cool-down: 8min"]
        );
    }

    #[test]
    fn test_accumulation_trims_long_conditioning() {
        // Arrange
        let context = AthleteContext::default().with_phase(Phase::Accumulation);
        let session = session_of(vec![entry("Bike Intervals", 10, "5 min", ExerciseType::Conditioning)]);

        // Act
        let out = run(phase_scale, session, &context);

        // Assert
        assert_eq!(sets(&out), vec![Some(6)]);
    }

    #[test]
    fn test_strength_sets_are_raised_to_minimums() {
        // Arrange
        let session = session_of(vec![
            entry("Back Squat 1x5", 1, "5", ExerciseType::Strength),
            entry("Nordic Hamstring Curl", 1, "5", ExerciseType::Strength),
            entry("Bench Press", 4, "5", ExerciseType::Strength),
            entry("Bicep Curl", 1, "12", ExerciseType::Hypertrophy),
        ]);

        // Act
        let out = run(enforce_limits, session, &AthleteContext::default());

        // Assert
        assert_eq!(sets(&out), vec![Some(3), Some(2), Some(4), Some(1)]);
        assert_eq!(out.session.exercises[0].name, "Back Squat 3x5");
        assert_eq!(out.notes_for(CorrectionPass::VolumeLimits).count(), 2);
    }

    #[test]
    fn test_deload_keeps_reduced_strength_sets() {
        // Arrange
        let context = AthleteContext::default().with_phase(Phase::Deload);
        let session = session_of(vec![entry("Bench Press", 2, "5", ExerciseType::Strength)]);

        // Act
        let out = run(enforce_limits, session.clone(), &context);

        // Assert
        assert_eq!(out.session, session);
    }

    #[test]
    fn test_boxing_rounds_are_capped() {
        // Arrange
        let session = session_of(vec![
            warmup(),
            entry("Shadow Boxing: 5x3min", 5, "3 minutes", ExerciseType::Technique),
            entry("Heavy Bag: 6x3min (power combos)", 6, "3 minutes", ExerciseType::Conditioning),
            entry("Boxing Circuit", 8, "3 minutes", ExerciseType::Conditioning),
            entry("Heavy Bag: 4x3min", 4, "3 minutes", ExerciseType::Conditioning),
            cooldown(),
        ]);

        // Act
        let out = run_for(Sport::Boxing, enforce_limits, session, &AthleteContext::default());

        // Assert
        assert_eq!(sets(&out), vec![Some(1), Some(3), Some(3), Some(4), Some(4), Some(1)]);
        assert_eq!(out.session.exercises[1].name, "Shadow Boxing: 3x3min");
        assert_eq!(out.session.exercises[2].name, "Heavy Bag: 3x3min (power combos)");
    }

    #[test]
    fn test_round_caps_only_apply_to_their_sport() {
        // Arrange
        let session = session_of(vec![entry("Heavy Bag: 6x3min", 6, "3 minutes", ExerciseType::Conditioning)]);

        // Act
        let out = run(enforce_limits, session.clone(), &AthleteContext::default());

        // Assert
        assert_eq!(out.session, session);
        assert!(out.notes.is_empty());
    }
}
