use crate::classifier::SessionView;
use crate::models::{AthleteContext, CategoryScore, ValidationFinding};
use crate::rules::RuleSet;

/// Set-weighted stimulus-to-fatigue ratio of the working exercises
pub fn score_sfr(view: &SessionView, _context: &AthleteContext, rules: &RuleSet) -> CategoryScore {
  let (weighted, sets) = view.working().fold((0.0, 0u32), |(weighted, sets), e| {
    (weighted + f64::from(rules.sfr(e.pattern)) * f64::from(e.sets()), sets + e.sets())
  });
  if sets == 0 {
    return CategoryScore::neutral(ValidationFinding::info("sfr_no_work", "No working sets to rate"));
  }

  let average = weighted / f64::from(sets);
  let score = if average >= 7.0 {
    100.0
  } else if average >= 6.0 {
    80.0
  } else if average >= 5.0 {
    60.0
  } else {
    40.0
  };

  CategoryScore::new(
    score,
    vec![ValidationFinding::info("sfr_average", format!("Average SFR {:.1} over {} sets", average, sets))],
  )
}
