use crate::classifier::SessionView;
use crate::models::{
  AthleteContext, CategoryScore, ExerciseType, Goal, MovementPattern, Sex, Sport, ValidationFinding,
};
use crate::rules::RuleSet;

/// Fight-week sessions at or under this many working sets earn the taper bonus
const FIGHT_WEEK_SET_CEILING: u32 = 15;

/// Accumulates points and findings for one sport's checklist
struct Checklist {
  score: f64,
  findings: Vec<ValidationFinding>,
}

impl Checklist {
  fn new() -> Self {
    Self { score: 0.0, findings: Vec::new() }
  }

  /// Award `points` when `present`, otherwise `fallback` and a suggestion
  fn check(&mut self, present: bool, points: f64, fallback: f64, id: &str, missing: &str) {
    if present {
      self.score += points;
    } else {
      self.score += fallback;
      self.findings.push(ValidationFinding::warning(id, missing));
    }
  }

  fn finish(self) -> CategoryScore {
    CategoryScore::new(self.score.clamp(0.0, 100.0), self.findings)
  }
}

/// Sport-dependent checklist of what a session for this athlete should contain
pub fn score_sport_specificity(view: &SessionView, context: &AthleteContext, _rules: &RuleSet) -> CategoryScore {
  match &view.sport {
    Sport::Football => football(view, context),
    Sport::Basketball => basketball(view, context),
    Sport::Boxing => boxing(view, context),
    Sport::Gym | Sport::General => gym(view, context),
    Sport::Other(label) => CategoryScore::neutral(ValidationFinding::info(
      "no_sport_profile",
      format!("No sport profile for '{}'", label),
    )),
  }
}

fn football(view: &SessionView, context: &AthleteContext) -> CategoryScore {
  let mut list = Checklist::new();
  list.check(
    view.has_pattern(MovementPattern::KneeFlexion)
      || view.mentions(&["hamstring", "nordic", "rdl", "romanian", "glute ham"]),
    25.0,
    0.0,
    "football_missing_hamstring",
    "No hamstring injury-prevention work (Nordic curls, RDL)",
  );
  list.check(
    view.mentions(&["adductor", "copenhagen", "groin"]),
    15.0,
    5.0,
    "football_missing_adductor",
    "No adductor work (Copenhagen plank)",
  );
  list.check(
    view.any(|e| e.is_unilateral),
    20.0,
    0.0,
    "football_missing_unilateral",
    "No single-leg work",
  );
  list.check(
    view.has_pattern(MovementPattern::Plyometric),
    20.0,
    5.0,
    "football_missing_plyometric",
    "No plyometric or jumping work",
  );
  list.check(
    view.any(|e| matches!(e.pattern, MovementPattern::CoreAntiRotation | MovementPattern::CoreAntiLateral)),
    10.0,
    0.0,
    "football_missing_anti_rotation",
    "No anti-rotation core work",
  );
  if context.role_is("goalkeeper") || context.role_is("portiere") {
    list.check(
      view.mentions(&["reaction", "reactive", "dive", "lateral"]),
      10.0,
      0.0,
      "goalkeeper_missing_reactivity",
      "Goalkeeper session without reactive or lateral work",
    );
  } else {
    list.score += 10.0;
  }
  list.finish()
}

fn basketball(view: &SessionView, context: &AthleteContext) -> CategoryScore {
  let mut list = Checklist::new();
  list.check(
    view.has_pattern(MovementPattern::Plyometric) || view.mentions(&["jump"]),
    25.0,
    0.0,
    "basketball_missing_jump",
    "No jump or plyometric work",
  );
  list.check(
    view.mentions(&["ankle", "tibialis", "calf", "knee", "balance"]),
    20.0,
    0.0,
    "basketball_missing_prehab",
    "No ankle or knee prehab",
  );
  list.check(
    view.mentions(&["lateral", "shuffle", "agility", "defensive slide", "closeout"]),
    20.0,
    0.0,
    "basketball_missing_lateral",
    "No lateral agility work",
  );
  list.check(
    view.has_pattern(MovementPattern::HorizontalPull) || view.has_pattern(MovementPattern::VerticalPull),
    15.0,
    0.0,
    "basketball_missing_pull",
    "No upper-body pulling",
  );
  list.check(
    view.any(|e| e.pattern.is_core()),
    10.0,
    0.0,
    "basketball_missing_core",
    "No core work",
  );
  if context.sex == Some(Sex::Female) {
    list.check(
      view.mentions(&["nordic", "landing", "single leg", "copenhagen"]) || view.has_pattern(MovementPattern::KneeFlexion),
      10.0,
      0.0,
      "basketball_missing_acl_prevention",
      "No ACL-prevention work (landing mechanics, Nordic curls)",
    );
  } else {
    list.score += 10.0;
  }
  list.finish()
}

fn boxing(view: &SessionView, context: &AthleteContext) -> CategoryScore {
  let mut list = Checklist::new();
  list.check(
    view.has_pattern(MovementPattern::BoxingTechnique),
    15.0,
    0.0,
    "boxing_missing_technique",
    "No technical boxing (shadow, pads)",
  );
  list.check(
    view.any(|e| matches!(e.pattern, MovementPattern::CoreRotation | MovementPattern::CoreAntiRotation)),
    10.0,
    0.0,
    "boxing_missing_rotation",
    "No rotational core work",
  );
  list.check(
    view.has_pattern(MovementPattern::BoxingBag),
    15.0,
    0.0,
    "boxing_missing_bag",
    "No bag or pad work",
  );
  list.check(
    view.has_pattern(MovementPattern::BoxingFootwork),
    10.0,
    0.0,
    "boxing_missing_footwork",
    "No footwork drills",
  );
  list.check(
    view.has_pattern(MovementPattern::BoxingDefense),
    10.0,
    0.0,
    "boxing_missing_defense",
    "No defensive drills",
  );
  list.check(
    view.any(|e| {
      e.kind() == ExerciseType::Conditioning
        || matches!(e.pattern, MovementPattern::BoxingConditioning | MovementPattern::Conditioning)
    }),
    10.0,
    0.0,
    "boxing_missing_conditioning",
    "No conditioning",
  );
  list.check(
    view.any(|e| e.pattern.is_explosive()),
    10.0,
    0.0,
    "boxing_missing_power",
    "No explosive power work",
  );
  list.check(
    view.has_pattern(MovementPattern::Neck),
    10.0,
    0.0,
    "boxing_missing_neck",
    "No neck strengthening",
  );
  if context.is_pre_event() {
    let sets = view.working_sets();
    if sets <= FIGHT_WEEK_SET_CEILING {
      list.score += 10.0;
    } else {
      list.score -= 10.0;
      list.findings.push(ValidationFinding::warning(
        "fight_week_volume",
        format!("{} working sets in fight week (ceiling {})", sets, FIGHT_WEEK_SET_CEILING),
      ));
    }
  } else {
    list.score += 10.0;
  }
  list.finish()
}

fn gym(view: &SessionView, context: &AthleteContext) -> CategoryScore {
  let mut list = Checklist::new();
  let working = view.working().count().max(1) as f64;

  match context.goal {
    Goal::Strength => {
      let heavy = view.working().filter(|e| e.is_heavy() && e.is_compound()).count();
      list.score += match heavy {
        0 => 10.0,
        1 => 30.0,
        _ => 50.0,
      };
      let compound_share = view.working().filter(|e| e.is_compound()).count() as f64 / working;
      list.check(
        compound_share >= 0.5,
        30.0,
        15.0,
        "strength_low_compound_share",
        "Less than half the exercises are compound lifts",
      );
      list.check(
        view.working().any(|e| e.rest_seconds.is_some_and(|r| r >= 150)),
        20.0,
        10.0,
        "strength_short_rest",
        "No heavy set has 2.5+ minutes rest",
      );
    }
    Goal::Hypertrophy => {
      list.check(
        view.any(|e| e.pattern.is_isolation()),
        30.0,
        10.0,
        "hypertrophy_missing_isolation",
        "No isolation work",
      );
      let sets = view.working_sets();
      list.score += if sets >= 15 {
        40.0
      } else if sets >= 10 {
        25.0
      } else {
        10.0
      };
      let in_range = view
        .working()
        .filter(|e| e.reps.max_count().is_some_and(|r| (6..=15).contains(&r)))
        .count() as f64;
      list.check(
        in_range / working >= 0.5,
        30.0,
        15.0,
        "hypertrophy_rep_range",
        "Most exercises fall outside 6-15 reps",
      );
    }
    Goal::Power => {
      let explosive: Vec<_> = view.working().filter(|e| e.pattern.is_explosive()).collect();
      list.check(!explosive.is_empty(), 50.0, 10.0, "power_missing_explosive", "No explosive work");
      let first_main = view.working().next().map(|e| e.index);
      list.check(
        explosive.first().map(|e| e.index) == first_main && first_main.is_some(),
        30.0,
        15.0,
        "power_not_first",
        "Explosive work is not the first main exercise",
      );
      list.check(
        explosive.iter().all(|e| e.rest_seconds.map_or(true, |r| r >= 90)),
        20.0,
        10.0,
        "power_short_rest",
        "Explosive work with under 90s rest",
      );
    }
    Goal::Endurance => {
      list.check(
        view.any(|e| e.kind() == ExerciseType::Conditioning || e.pattern == MovementPattern::Conditioning),
        50.0,
        20.0,
        "endurance_missing_conditioning",
        "No conditioning",
      );
      let short_rest = view.working().filter(|e| e.rest_seconds.is_some_and(|r| r <= 60)).count() as f64;
      list.check(short_rest / working >= 0.5, 30.0, 15.0, "endurance_long_rest", "Rest periods are long for endurance");
      list.score += 20.0;
    }
    Goal::General => {
      list.score += 60.0;
      list.check(view.any(|e| e.is_compound()), 20.0, 0.0, "general_missing_compound", "No compound lifts");
      list.check(view.any(|e| e.pattern.is_core()), 20.0, 0.0, "general_missing_core", "No core work");
    }
  }
  list.finish()
}
