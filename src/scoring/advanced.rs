use crate::classifier::SessionView;
use crate::collaborators::AdvancedScience;
use crate::models::{AthleteContext, CategoryScore, ValidationFinding};

/// Delegate to the external analysis. Missing or failing collaborators
/// yield the neutral score; out-of-range results are neutralized later
/// when the categories are combined.
pub fn score_advanced_science(
  view: &SessionView,
  context: &AthleteContext,
  advanced: Option<&dyn AdvancedScience>,
) -> CategoryScore {
  let Some(advanced) = advanced else {
    return CategoryScore::neutral(ValidationFinding::info(
      "advanced_science_unavailable",
      "Advanced analysis not configured",
    ));
  };

  match advanced.full_analysis(view.session, context) {
    Ok(analysis) => CategoryScore::new(analysis.score, analysis.findings),
    Err(e) => {
      tracing::warn!(error = %e, "Advanced analysis failed, using neutral score");
      CategoryScore::neutral(ValidationFinding::warning(
        "advanced_science_failed",
        format!("Advanced analysis failed: {}", e),
      ))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::classifier::PatternClassifier;
  use crate::rules::RuleSet;
  use crate::test_utils::{gym_session, FailingAdvancedScience, FixedAdvancedScience};

  fn score(advanced: Option<&dyn AdvancedScience>) -> CategoryScore {
    let rules = RuleSet::default();
    let classifier = PatternClassifier::from_rules(&rules).unwrap();
    let session = gym_session();
    let context = AthleteContext::default();
    let view = SessionView::new(&session, &context, &rules, &classifier);
    score_advanced_science(&view, &context, advanced)
  }

  #[test]
  fn test_missing_collaborator_is_neutral() {
    let result = score(None);
    assert_eq!(result.score, 50.0);
    assert_eq!(result.findings[0].id, "advanced_science_unavailable");
  }

  #[test]
  fn test_failure_is_neutral_with_warning() {
    // Act
    let result = score(Some(&FailingAdvancedScience));

    // Assert
    assert_eq!(result.score, 50.0);
    assert_eq!(result.findings[0].id, "advanced_science_failed");
    assert!(result.findings[0].message.contains("mock outage"));
  }

  #[test]
  fn test_result_is_passed_through() {
    let result = score(Some(&FixedAdvancedScience(88.0)));
    assert_eq!(result.score, 88.0);
    assert_eq!(result.findings[0].id, "mock_analysis");
  }
}
