//! Category scorer
//!
//! Eight independent category functions, each returning a 0-100 score with
//! its findings, combined through the rule set's weights into one overall
//! score and grade. Category functions never see each other's output.

mod advanced;
mod biomechanics;
mod context;
mod safety;
mod sequencing;
mod sfr;
mod sport;
mod volume;

use std::collections::BTreeMap;

pub use advanced::score_advanced_science;
pub use biomechanics::score_biomechanics;
pub use context::score_context;
pub use safety::score_safety;
pub use sequencing::score_sequencing;
pub use sfr::score_sfr;
pub use sport::score_sport_specificity;
pub use volume::score_volume;

use crate::classifier::SessionView;
use crate::collaborators::{AdvancedScience, MethodSelector};
use crate::models::{AthleteContext, Category, CategoryScore, Grade, ScoreReport, ValidationFinding};
use crate::rules::RuleSet;

/// Score given to a category that has nothing to judge or misbehaved
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Optional services the scorer may consult
#[derive(Clone, Copy, Default)]
pub struct ScoringCollaborators<'a> {
  pub advanced: Option<&'a dyn AdvancedScience>,
  pub methods: Option<&'a dyn MethodSelector>,
}

/// Score every category and combine them
pub fn score(
  view: &SessionView,
  context: &AthleteContext,
  rules: &RuleSet,
  collaborators: ScoringCollaborators,
) -> ScoreReport {
  let per_category = BTreeMap::from([
    (Category::Volume, score_volume(view, context, rules)),
    (Category::Sequencing, score_sequencing(view, context, rules)),
    (Category::Biomechanics, score_biomechanics(view, context, rules)),
    (Category::SportSpecificity, score_sport_specificity(view, context, rules)),
    (Category::Safety, score_safety(view, context, rules)),
    (Category::Context, score_context(view, context, rules, collaborators.methods)),
    (Category::Sfr, score_sfr(view, context, rules)),
    (
      Category::AdvancedScience,
      score_advanced_science(view, context, collaborators.advanced),
    ),
  ]);
  combine(per_category, rules)
}

/// Weighted mean of the category scores. A score that is not a finite number
/// in 0..=100 is replaced by the neutral 50 before it reaches the total.
pub fn combine(mut per_category: BTreeMap<Category, CategoryScore>, rules: &RuleSet) -> ScoreReport {
  let mut weighted = 0.0;
  let mut total_weight = 0.0;

  for (category, detail) in per_category.iter_mut() {
    if !detail.score.is_finite() || !(0.0..=100.0).contains(&detail.score) {
      tracing::warn!(category = %category, score = detail.score, "Category score out of range, using neutral");
      detail.findings.push(ValidationFinding::warning(
        "invalid_category_score",
        format!("{} produced an invalid score; treated as neutral", category),
      ));
      detail.score = NEUTRAL_SCORE;
    }
    let weight = rules.weights.weight(*category);
    tracing::debug!(category = %category, score = detail.score, weight, "Category scored");
    weighted += detail.score * weight;
    total_weight += weight;
  }

  let overall = if total_weight > 0.0 { weighted / total_weight } else { NEUTRAL_SCORE };
  let overall_score = overall.round().clamp(0.0, 100.0) as u8;

  ScoreReport {
    overall_score,
    grade: Grade::from_score(overall_score, &rules.grade_bands),
    per_category,
  }
}

/// Points for a value inside a target band, a wider tolerance band, or outside both
pub(crate) fn band_points(value: f64, target: (f64, f64), tolerance: (f64, f64), points: (f64, f64, f64)) -> f64 {
  if value >= target.0 && value <= target.1 {
    points.0
  } else if value >= tolerance.0 && value <= tolerance.1 {
    points.1
  } else {
    points.2
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::classifier::PatternClassifier;
  use crate::models::Grade;
  use crate::test_utils::{gym_session, FixedAdvancedScience};
  use proptest::prelude::*;

  fn all_at(score: f64) -> BTreeMap<Category, CategoryScore> {
    Category::ALL.iter().map(|c| (*c, CategoryScore::new(score, vec![]))).collect()
  }

  #[test]
  fn test_weighted_mean() {
    // Arrange
    let rules = RuleSet::default();
    let mut categories = all_at(100.0);
    categories.insert(Category::SportSpecificity, CategoryScore::new(0.0, vec![]));

    // Act
    let report = combine(categories, &rules);

    // Assert
    assert_eq!(report.overall_score, 80);
    assert_eq!(report.grade, Grade::A);
  }

  #[test]
  fn test_nan_score_is_neutralized() {
    // Arrange
    let rules = RuleSet::default();
    let mut categories = all_at(50.0);
    categories.insert(Category::Safety, CategoryScore::new(f64::NAN, vec![]));
    categories.insert(Category::Volume, CategoryScore::new(250.0, vec![]));

    // Act
    let report = combine(categories, &rules);

    // Assert
    assert_eq!(report.overall_score, 50);
    assert_eq!(report.category(Category::Safety).unwrap().score, 50.0);
    assert!(report.category(Category::Volume).unwrap().findings.iter().any(|f| f.id == "invalid_category_score"));
  }

  #[test]
  fn test_full_report_has_every_category() {
    // Arrange
    let rules = RuleSet::default();
    let classifier = PatternClassifier::from_rules(&rules).unwrap();
    let session = gym_session();
    let context = AthleteContext::default();
    let view = SessionView::new(&session, &context, &rules, &classifier);
    let advanced = FixedAdvancedScience(75.0);

    // Act
    let report = score(
      &view,
      &context,
      &rules,
      ScoringCollaborators { advanced: Some(&advanced), methods: None },
    );

    // Assert
    assert_eq!(report.per_category.len(), Category::ALL.len());
    assert_eq!(report.category(Category::AdvancedScience).unwrap().score, 75.0);
    assert!(report.overall_score > 50);
  }

  proptest! {
    #[test]
    fn test_overall_score_always_in_range(
      scores in proptest::collection::vec(
        prop_oneof![
          Just(f64::NAN),
          Just(f64::INFINITY),
          Just(f64::NEG_INFINITY),
          -500.0f64..500.0,
        ],
        8,
      ),
    ) {
      let rules = RuleSet::default();
      let categories: BTreeMap<Category, CategoryScore> = Category::ALL
        .iter()
        .zip(scores.iter())
        .map(|(c, s)| (*c, CategoryScore::new(*s, vec![])))
        .collect();

      let report = combine(categories, &rules);

      prop_assert!(report.overall_score <= 100);
      for detail in report.per_category.values() {
        prop_assert!(detail.score.is_finite() && (0.0..=100.0).contains(&detail.score));
      }
    }
  }
}
