use regex::Regex;

use crate::classifier::normalize_name;
use crate::config::ConfigError;
use crate::models::ExerciseEntry;
use crate::prescription::{find_name_token, has_digits};
use crate::rules::NamingRules;

use super::sync::sets_plausible;
use super::{Correction, CorrectionPass, PassContext};

/// Compiled vague-name patterns
#[derive(Debug, Clone)]
pub struct NamingPatterns {
    vague: Vec<(Regex, String)>,
}

impl NamingPatterns {
    pub fn compile(rules: &NamingRules) -> Result<Self, ConfigError> {
        let vague = rules
            .vague
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, rule.template.clone()))
                    .map_err(|source| ConfigError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { vague })
    }

    fn vague_template(&self, normalized: &str) -> Option<&str> {
        self.vague
            .iter()
            .find(|(re, _)| re.is_match(normalized))
            .map(|(_, template)| template.as_str())
    }
}

/// Template for a short unspecific name: sport keyword, then round-based,
/// then exercise type, then the generic fallback
fn expansion(entry: &ExerciseEntry, normalized: &str, cx: &PassContext<'_>) -> Option<String> {
    let naming = &cx.rules.naming;
    let words = normalized.split_whitespace().count();
    if has_digits(&entry.name) || words == 0 || words > naming.max_expand_words {
        return None;
    }
    if cx.is_warmup(entry) || cx.is_cooldown(entry) || !cx.pattern(entry).is_unspecific() {
        return None;
    }
    if naming
        .acceptable
        .iter()
        .any(|k| normalized.contains(normalize_name(k).as_str()))
    {
        return None;
    }

    let template = naming
        .sport_expansions
        .get(cx.sport.key())
        .and_then(|list| {
            list.iter()
                .find(|k| normalized.contains(normalize_name(&k.keyword).as_str()))
        })
        .map(|k| k.template.as_str())
        .or_else(|| {
            cx.fixed(entry)
                .filter(|f| f.round_based())
                .map(|_| naming.round_based_expansion.as_str())
        })
        .or_else(|| naming.type_expansions.get(&entry.exercise_type).map(String::as_str))
        .unwrap_or(naming.fallback_expansion.as_str());

    Some(template.replace("{name}", entry.name.trim()))
}

fn renamed(entry: &ExerciseEntry, cx: &PassContext<'_>) -> Option<String> {
    let normalized = normalize_name(&entry.name);
    if let Some(template) = cx.rules.naming.exact.get(&normalized) {
        return Some(template.clone());
    }
    if let Some(template) = cx.naming.vague_template(&normalized) {
        return Some(template.to_string());
    }
    expansion(entry, &normalized, cx)
}

/// Carry an explicit set count into the template's token
fn keep_set_count(name: String, sets: Option<u32>) -> String {
    let Some(sets) = sets.filter(|s| *s > 0) else {
        return name;
    };
    let Some(found) = find_name_token(&name) else {
        return name;
    };
    let token = found.token.with_sets(sets);
    if sets_plausible(&found.token) && sets_plausible(&token) && token != found.token {
        found.replace_in(&name, &token)
    } else {
        name
    }
}

/// Replace vague names with fully specified protocols
pub(super) fn normalize_names(out: &mut Correction, cx: &PassContext<'_>) {
    for index in 0..out.session.exercises.len() {
        let entry = &out.session.exercises[index];
        if !entry.has_name() {
            continue;
        }
        let Some(name) = renamed(entry, cx).map(|n| keep_set_count(n, entry.sets)) else {
            continue;
        };
        if name == entry.name {
            continue;
        }
        let message = format!("'{}' -> '{}'", entry.name, name);
        out.session.exercises[index].name = name;
        out.note(CorrectionPass::Naming, Some(index), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PatternClassifier;
    use crate::models::{AthleteContext, ExerciseType, Session, Sport};
    use crate::rules::{RuleSet, VagueRule};
    use crate::test_utils::{entry, session_of};
    use pretty_assertions::assert_eq;

    fn names_after(session: Session, sport: Sport) -> Vec<String> {
        let rules = RuleSet::default();
        let classifier = PatternClassifier::from_rules(&rules).unwrap();
        let naming = NamingPatterns::compile(&rules.naming).unwrap();
        let context = AthleteContext::for_sport(sport.clone());
        let cx = PassContext {
            rules: &rules,
            classifier: &classifier,
            naming: &naming,
            athlete: &context,
            sport,
            low_intensity: false,
        };
        let mut out = Correction::new(session);
        normalize_names(&mut out, &cx);
        out.session.exercises.into_iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_exact_name_gets_protocol() {
        // Arrange
        let session = session_of(vec![ExerciseEntry::new("Cardio", None, "", ExerciseType::Conditioning)]);

        // Act
        let names = names_after(session, Sport::Gym);

        // Assert
        assert_eq!(names, vec!["Zone 2 Cardio: 20min steady (conversational pace, 120-140 bpm)"]);
    }

    #[test]
    fn test_vague_pattern_gets_protocol() {
        // Arrange
        let session = session_of(vec![ExerciseEntry::new(
            "Boxing Conditioning",
            None,
            "",
            ExerciseType::Conditioning,
        )]);

        // Act
        let names = names_after(session, Sport::Boxing);

        // Assert
        assert_eq!(names, vec!["MetCon: 4x (10 Burpees + 15 KB Swings + 10 Box Jumps) - 90s rest"]);
    }

    #[test]
    fn test_template_keeps_explicit_set_count() {
        // Arrange
        let session = session_of(vec![entry("heavy-bag", 6, "3", ExerciseType::Conditioning)]);

        // Act
        let names = names_after(session, Sport::Boxing);

        // Assert
        assert_eq!(names, vec!["Heavy Bag: 6x3min (power combos, 1-2-3, body-head) - 1min rest"]);
    }

    #[test]
    fn test_type_and_fallback_expansion() {
        // Arrange
        let session = session_of(vec![
            ExerciseEntry::new("Blaze Series", None, "", ExerciseType::Power),
            ExerciseEntry::new("Blaze Series", None, "", ExerciseType::Unknown),
        ]);

        // Act
        let names = names_after(session, Sport::Gym);

        // Assert
        assert_eq!(
            names,
            vec![
                "Blaze Series: 5x3 (maximal intent, full recovery)",
                "Blaze Series: 3x10-12 (adjust load as needed)",
            ]
        );
    }

    #[test]
    fn test_specific_names_are_kept() {
        // Arrange
        let session = session_of(vec![
            entry("Back Squat", 4, "5", ExerciseType::Strength),
            entry("Heavy Bag: 6x3min", 6, "3 minutes", ExerciseType::Conditioning),
            entry("Pallof Press", 3, "10", ExerciseType::Hypertrophy),
            ExerciseEntry::new("", None, "", ExerciseType::Unknown),
        ]);

        // Act
        let names = names_after(session.clone(), Sport::Boxing);

        // Assert
        let before: Vec<String> = session.exercises.into_iter().map(|e| e.name).collect();
        assert_eq!(names, before);
    }

    #[test]
    fn test_invalid_vague_pattern_is_a_config_error() {
        // Arrange
        let mut rules = NamingRules::default();
        rules.vague.push(VagueRule {
            pattern: "(unclosed".into(),
            template: "x".into(),
        });

        // Act
        let result = NamingPatterns::compile(&rules);

        // Assert
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }
}
