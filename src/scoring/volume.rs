use crate::classifier::{Balance, Chain, SessionView};
use crate::models::{AthleteContext, CategoryScore, ValidationFinding};
use crate::rules::RuleSet;

use super::band_points;

/// Working-set band and its tolerance band
fn set_bands(sport_specific: bool) -> ((f64, f64), (f64, f64)) {
  if sport_specific {
    ((12.0, 35.0), (8.0, 40.0))
  } else {
    ((15.0, 30.0), (10.0, 35.0))
  }
}

/// Total working sets against a sport band, balance of the set
/// distribution, and fit to an experience-adjusted target
pub fn score_volume(view: &SessionView, context: &AthleteContext, _rules: &RuleSet) -> CategoryScore {
  let mut findings = Vec::new();
  let sets = view.working_sets() as f64;
  let entries = view.working().count();

  // Band
  let (target, tolerance) = set_bands(view.sport.is_sport_specific());
  let far_points = if sets < tolerance.0 { 15.0 } else { 0.0 };
  let band = band_points(sets, target, tolerance, (30.0, 20.0, far_points));
  if band < 30.0 {
    findings.push(ValidationFinding::warning(
      "volume_outside_band",
      format!("{} working sets, target {:.0}-{:.0}", sets, target.0, target.1),
    ));
  }

  // Balance
  let push = view.sets_where(|e| e.balance() == Some(Balance::Push)) as f64;
  let pull = view.sets_where(|e| e.balance() == Some(Balance::Pull)) as f64;
  let anterior = view.sets_where(|e| e.chain() == Some(Chain::Anterior)) as f64;
  let posterior = view.sets_where(|e| e.chain() == Some(Chain::Posterior)) as f64;
  let push_pull_ok = push == 0.0 || pull >= push * 0.8;
  let chain_ok = anterior == 0.0 || posterior >= anterior * 0.7;
  let balance = match (push_pull_ok, chain_ok) {
    (true, true) => 30.0,
    (true, false) | (false, true) => 20.0,
    (false, false) => 10.0,
  };
  if !push_pull_ok {
    findings.push(ValidationFinding::info(
      "push_pull_volume",
      format!("{} push sets against {} pull sets", push, pull),
    ));
  }

  // Experience target
  let level_target = 20.0 * context.level.volume_multiplier();
  let level = if (sets - level_target).abs() <= 8.0 { 20.0 } else { 10.0 };

  // Sets per exercise
  let average = if entries > 0 { sets / entries as f64 } else { 0.0 };
  let per_exercise = if (3.0..=5.0).contains(&average) { 20.0 } else { 10.0 };

  let load: f64 = view
    .working()
    .map(|e| e.sets() as f64 * e.reps.equivalent_reps())
    .sum();
  findings.push(ValidationFinding::info(
    "volume_load",
    format!("{} working sets over {} exercises, about {:.0} total reps", sets, entries, load),
  ));

  CategoryScore::new(band + balance + level + per_exercise, findings)
}
