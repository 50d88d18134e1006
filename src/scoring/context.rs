use crate::classifier::SessionView;
use crate::collaborators::MethodSelector;
use crate::models::{AthleteContext, CategoryScore, Phase, Sport, ValidationFinding};
use crate::rules::RuleSet;

/// Working sets a pre-match or post-match session should stay under
const LIGHT_SESSION_SETS: u32 = 12;
/// Working sets above which a fatigued athlete is flagged
const FATIGUE_SET_CEILING: u32 = 20;
/// Method suggestions surfaced as findings
const METHOD_SUGGESTIONS: usize = 3;

fn phase_points(view: &SessionView, phase: Option<Phase>, findings: &mut Vec<ValidationFinding>) -> f64 {
  let sets = view.working_sets();
  let heavy = view.any(|e| e.is_heavy() && e.is_compound());
  let explosive = view.any(|e| e.pattern.is_explosive());

  let Some(phase) = phase else {
    findings.push(ValidationFinding::info("no_phase", "No training phase given"));
    return 15.0;
  };

  let fits = match phase {
    Phase::Accumulation => sets >= 18,
    Phase::Intensification => heavy,
    Phase::Peaking => sets <= 20 && (explosive || heavy),
    Phase::Deload => sets <= 15,
  };
  if fits {
    30.0
  } else {
    findings.push(ValidationFinding::info(
      "phase_mismatch",
      format!("Session does not match the {} phase ({} working sets)", phase, sets),
    ));
    15.0
  }
}

fn proximity_points(view: &SessionView, context: &AthleteContext, findings: &mut Vec<ValidationFinding>) -> f64 {
  let sets = view.working_sets();
  let light = sets <= LIGHT_SESSION_SETS && !view.any(|e| e.is_heavy());

  if view.sport.is_team_sport() {
    if context.is_pre_event() {
      return if light {
        35.0
      } else {
        findings.push(ValidationFinding::warning(
          "match_day_minus_one_load",
          format!("{} working sets the day before a match", sets),
        ));
        10.0
      };
    }
    if context.match_day_offset == Some(1) {
      return if view.low_intensity || sets <= LIGHT_SESSION_SETS {
        35.0
      } else {
        findings.push(ValidationFinding::warning(
          "match_day_plus_one_load",
          "Post-match session is not a recovery session",
        ));
        10.0
      };
    }
    return 20.0;
  }

  // Fight week counts as pre-event for boxers
  if context.is_pre_event() {
    let id = if view.sport == Sport::Boxing { "fight_week_load" } else { "pre_event_load" };
    return if light {
      35.0
    } else {
      findings.push(ValidationFinding::warning(id, format!("{} working sets close to competition", sets)));
      10.0
    };
  }
  25.0
}

fn feedback_points(view: &SessionView, context: &AthleteContext, findings: &mut Vec<ValidationFinding>) -> f64 {
  let Some(feedback) = context.feedback.as_ref() else {
    return 20.0;
  };
  let sets = view.working_sets();
  if feedback.shows_fatigue() && sets > FATIGUE_SET_CEILING {
    findings.push(ValidationFinding::warning(
      "fatigue_high_volume",
      format!("{} working sets while recent sessions show fatigue", sets),
    ));
    10.0
  } else {
    35.0
  }
}

/// Fit to the periodization phase, match or fight proximity, and recent
/// feedback. Method suggestions are attached as info findings only.
pub fn score_context(
  view: &SessionView,
  context: &AthleteContext,
  _rules: &RuleSet,
  methods: Option<&dyn MethodSelector>,
) -> CategoryScore {
  let mut findings = Vec::new();

  let score = phase_points(view, context.effective_phase(), &mut findings)
    + proximity_points(view, context, &mut findings)
    + feedback_points(view, context, &mut findings);

  if let Some(selector) = methods {
    let mut ranked = selector.select_methods(context);
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    for method in ranked.into_iter().take(METHOD_SUGGESTIONS) {
      let message = match method.rationale {
        Some(why) => format!("{} ({:.2}): {}", method.name, method.score, why),
        None => format!("{} ({:.2})", method.name, method.score),
      };
      findings.push(ValidationFinding::info("method_suggestion", message));
    }
  }

  CategoryScore::new(score.clamp(0.0, 100.0), findings)
}
