use crate::classifier::{ClassifiedEntry, SessionView};
use crate::models::{AthleteContext, CategoryScore, ValidationFinding};
use crate::rules::{Contraindication, RuleSet};

/// Points returned once when the session carries prehab work
const PREHAB_BONUS: f64 = 10.0;

fn violates(entry: &ClassifiedEntry, rule: &Contraindication) -> bool {
  if rule.avoid_patterns.contains(&entry.pattern) {
    return true;
  }
  let name = entry.lower_name();
  rule.avoid_keywords.iter().any(|k| name.contains(k.as_str()))
}

/// Contraindications for the athlete's injuries and reported pain areas.
///
/// Each violation removes its rule's percentage from what is left of the
/// score, so more violations always mean a lower score. Prehab work from
/// entries that are not themselves contraindicated earns a small bonus.
pub fn score_safety(view: &SessionView, context: &AthleteContext, rules: &RuleSet) -> CategoryScore {
  let injuries = context.effective_injuries();
  if injuries.is_empty() {
    return CategoryScore::new(100.0, vec![ValidationFinding::info("no_injuries", "No injuries on record")]);
  }

  let active: Vec<&Contraindication> = rules
    .contraindications
    .iter()
    .filter(|rule| {
      injuries
        .iter()
        .any(|injury| rule.injury_keywords.iter().any(|k| injury.contains(k.as_str())))
    })
    .collect();

  let prehab_keywords: Vec<&str> = rules.prehab_keywords.iter().map(String::as_str).collect();
  let mut findings = Vec::new();
  let mut score = 100.0;
  let mut prehab = false;

  for entry in view.working() {
    let mut clean = true;
    for rule in &active {
      if violates(entry, rule) {
        clean = false;
        score *= 1.0 - rule.penalty.clamp(0.0, 100.0) / 100.0;
        findings.push(
          ValidationFinding::warning(
            format!("contraindicated_{}", rule.id),
            format!("'{}' is contraindicated: {}", entry.name(), rule.reason),
          )
          .at(entry.index),
        );
      }
    }
    if clean && entry.mentions(&prehab_keywords) {
      prehab = true;
    }
  }

  if prehab {
    score = (score + PREHAB_BONUS).min(100.0);
    findings.push(ValidationFinding::info("prehab_present", "Session includes prehab work"));
  }

  tracing::debug!(injuries = injuries.len(), rules = active.len(), score, "Safety scored");
  CategoryScore::new(score, findings)
}
