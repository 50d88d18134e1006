use crate::classifier::{ClassifiedEntry, SessionView};
use crate::models::{ExerciseType, MovementPattern};
use crate::prescription::{superset_slot, SupersetRole};

use super::structure::consolidate_warmups;
use super::{Correction, CorrectionPass, PassContext};

/// Session phase, in the order the phases should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Warmup,
    Activation,
    Power,
    Strength,
    Hypertrophy,
    Conditioning,
    Accessory,
    Core,
    Cooldown,
}

fn stage(entry: &ClassifiedEntry<'_>) -> Stage {
    if entry.is_cooldown {
        return Stage::Cooldown;
    }
    if entry.is_warmup {
        return Stage::Warmup;
    }
    if !entry.has_name() {
        return Stage::Accessory;
    }
    if entry.is_heavy_conditioning() || entry.pattern.is_boxing() {
        return Stage::Conditioning;
    }
    if entry.pattern == MovementPattern::Mobility {
        return Stage::Activation;
    }
    if entry.pattern.is_explosive() || entry.kind() == ExerciseType::Power {
        return Stage::Power;
    }
    if entry.pattern.is_core() || entry.pattern == MovementPattern::Neck {
        return Stage::Core;
    }
    match entry.kind() {
        ExerciseType::Strength => Stage::Strength,
        ExerciseType::Hypertrophy => Stage::Hypertrophy,
        _ if entry.is_compound() => Stage::Strength,
        _ => Stage::Accessory,
    }
}

/// Stable sort of the session into phase order: warm-up, activation, power,
/// strength, hypertrophy, conditioning, accessories, core, cool-down
pub(super) fn repair_order(out: &mut Correction, cx: &PassContext<'_>) {
    let order: Vec<usize> = {
        let view = SessionView::new(&out.session, cx.athlete, cx.rules, cx.classifier);
        let mut staged: Vec<(Stage, usize)> = view.entries.iter().map(|e| (stage(e), e.index)).collect();
        // superset partners travel with their lead
        let slots: Vec<_> = view.entries.iter().map(|e| superset_slot(e.name())).collect();
        for (index, slot) in slots.iter().enumerate() {
            let Some(slot) = slot.filter(|s| s.role == SupersetRole::Follow) else {
                continue;
            };
            let lead = slots
                .iter()
                .position(|l| l.is_some_and(|l| l.group == slot.group && l.role == SupersetRole::Lead));
            if let Some(lead) = lead {
                staged[index].0 = staged[lead].0;
            }
        }
        staged.sort_by_key(|&(stage, _)| stage);
        staged.into_iter().map(|(_, index)| index).collect()
    };
    if order.iter().enumerate().all(|(at, &index)| at == index) {
        return;
    }

    let moved: Vec<String> = order
        .iter()
        .enumerate()
        .filter(|&(at, &index)| at != index)
        .map(|(_, &index)| format!("'{}'", out.session.exercises[index].name))
        .collect();
    let mut slots: Vec<Option<_>> = std::mem::take(&mut out.session.exercises).into_iter().map(Some).collect();
    out.session.exercises = order.iter().filter_map(|&index| slots[index].take()).collect();
    let first = order.iter().enumerate().position(|(at, &index)| at != index);
    out.note(
        CorrectionPass::Sequencing,
        first,
        format!("Reordered {} into phase order", moved.join(", ")),
    );

    // a warm-up pulled forward from mid-session joins the opening one
    consolidate_warmups(out, cx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PatternClassifier;
    use crate::corrector::NamingPatterns;
    use crate::models::{AthleteContext, Session, Sport};
    use crate::rules::RuleSet;
    use crate::test_utils::{cooldown, entry, session_of, warmup};
    use pretty_assertions::assert_eq;

    fn repair(session: Session) -> Correction {
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
        repair_order(&mut out, &cx);
        out
    }

    fn names(out: &Correction) -> Vec<&str> {
        out.session.exercises.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_strength_moves_before_conditioning_in_order() {
        // Arrange
        let session = session_of(vec![
            warmup(),
            entry("Pallof Press", 3, "10", ExerciseType::Hypertrophy),
            entry("Heavy Bag: 5x3min", 5, "3 minutes", ExerciseType::Conditioning),
            entry("Back Squat", 4, "5", ExerciseType::Strength),
            entry("Bench Press", 4, "5", ExerciseType::Strength),
            cooldown(),
        ]);

        // Act
        let out = repair(session);

        // Assert
        assert_eq!(
            names(&out),
            vec![
                "Dynamic Warm-up: 10min",
                "Back Squat",
                "Bench Press",
                "Heavy Bag: 5x3min",
                "Pallof Press",
                "Cool-down: 8min",
            ]
        );
        assert_eq!(out.notes.len(), 1);
        assert_eq!(out.notes[0].pass, CorrectionPass::Sequencing);
        assert_eq!(out.notes[0].entry_index, Some(1));
    }

    #[test]
    fn test_power_runs_before_strength() {
        // Arrange
        let session = session_of(vec![
            warmup(),
            entry("Back Squat", 4, "5", ExerciseType::Strength),
            entry("Box Jumps", 4, "5", ExerciseType::Power),
            cooldown(),
        ]);

        // Act
        let out = repair(session);

        // Assert
        assert_eq!(
            names(&out),
            vec!["Dynamic Warm-up: 10min", "Box Jumps", "Back Squat", "Cool-down: 8min"]
        );
    }

    #[test]
    fn test_isolation_and_core_follow_compound_work() {
        // Arrange
        let session = session_of(vec![
            warmup(),
            entry("Plank", 3, "45 sec", ExerciseType::Hypertrophy),
            entry("Bicep Curl", 3, "12", ExerciseType::Hypertrophy),
            entry("Deadlift", 3, "5", ExerciseType::Strength),
            cooldown(),
        ]);

        // Act
        let out = repair(session);

        // Assert
        assert_eq!(
            names(&out),
            vec!["Dynamic Warm-up: 10min", "Deadlift", "Bicep Curl", "Plank", "Cool-down: 8min"]
        );
    }

    #[test]
    fn test_misplaced_warmup_and_cooldown_are_pulled_to_the_ends() {
        // Arrange
        let session = session_of(vec![
            cooldown(),
            entry("Back Squat", 4, "5", ExerciseType::Strength),
            warmup(),
        ]);

        // Act
        let out = repair(session);

        // Assert
        assert_eq!(
            names(&out),
            vec!["Dynamic Warm-up: 10min", "Back Squat", "Cool-down: 8min"]
        );
    }

    #[test]
    fn test_second_warmup_is_merged_after_moving() {
        // Arrange
        let session = session_of(vec![
            warmup(),
            entry("Back Squat", 4, "5", ExerciseType::Strength),
            entry("Band Activation Warm-up", 1, "5 min", ExerciseType::Warmup),
            cooldown(),
        ]);

        // Act
        let out = repair(session);

        // Assert
        assert_eq!(
            names(&out),
            vec!["Dynamic Warm-up & Mobility", "Back Squat", "Cool-down: 8min"]
        );
        assert_eq!(out.notes[0].pass, CorrectionPass::Sequencing);
        assert_eq!(out.notes[1].pass, CorrectionPass::Structure);
    }

    #[test]
    fn test_superset_partners_stay_together() {
        // Arrange
        let session = session_of(vec![
            warmup(),
            entry("A1: Bench Press", 4, "5", ExerciseType::Strength),
            entry("A2: Chest Supported Row", 4, "10", ExerciseType::Hypertrophy),
            entry("Back Squat", 4, "5", ExerciseType::Strength),
            cooldown(),
        ]);

        // Act
        let out = repair(session.clone());

        // Assert
        assert_eq!(out.session, session);
    }

    #[test]
    fn test_ordered_session_is_untouched() {
        // Arrange
        let session = session_of(vec![
            warmup(),
            entry("Box Jumps", 4, "5", ExerciseType::Power),
            entry("Back Squat", 4, "5", ExerciseType::Strength),
            entry("Romanian Deadlift", 3, "8", ExerciseType::Hypertrophy),
            entry("Heavy Bag: 5x3min", 5, "3 minutes", ExerciseType::Conditioning),
            entry("Pallof Press", 3, "10", ExerciseType::Hypertrophy),
            cooldown(),
        ]);

        // Act
        let out = repair(session.clone());

        // Assert
        assert_eq!(out.session, session);
        assert!(out.notes.is_empty());
    }
}
