use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// ---------------------------------------------------------------------------
/// Sport
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sport {
  Football,
  Basketball,
  Boxing,
  Gym,
  #[default]
  General,
  Other(String),
}

impl Sport {
  pub fn from_label(label: &str) -> Self {
    let normalized = label.trim().to_lowercase();
    match normalized.as_str() {
      "football" | "soccer" | "calcio" => Self::Football,
      "basketball" | "basket" | "pallacanestro" => Self::Basketball,
      "boxing" | "boxe" | "kickboxing" | "muay thai" => Self::Boxing,
      "gym" | "palestra" | "fitness" | "strength" | "bodybuilding" => Self::Gym,
      "" | "general" | "generale" => Self::General,
      other => Self::Other(other.to_string()),
    }
  }

  /// The athlete's sport wins over the session label
  pub fn resolve(context: Option<&Sport>, session_sport: Option<&str>) -> Sport {
    match (context, session_sport) {
      (Some(sport), _) if *sport != Sport::General => sport.clone(),
      (_, Some(label)) => Sport::from_label(label),
      _ => Sport::General,
    }
  }

  pub fn is_team_sport(&self) -> bool {
    matches!(self, Self::Football | Self::Basketball)
  }

  /// Sports scored against skill-based rather than gym volume bands
  pub fn is_sport_specific(&self) -> bool {
    !matches!(self, Self::Gym | Self::General)
  }

  pub fn key(&self) -> &str {
    match self {
      Self::Football => "football",
      Self::Basketball => "basketball",
      Self::Boxing => "boxing",
      Self::Gym => "gym",
      Self::General => "general",
      Self::Other(label) => label,
    }
  }
}

impl From<String> for Sport {
  fn from(label: String) -> Self {
    Sport::from_label(&label)
  }
}

impl From<Sport> for String {
  fn from(sport: Sport) -> Self {
    sport.key().to_string()
  }
}

impl std::fmt::Display for Sport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.key())
  }
}

/// ---------------------------------------------------------------------------
/// Phase / Level / Goal
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Accumulation,
  Intensification,
  Peaking,
  Deload,
}

impl Phase {
  pub fn from_label(label: &str) -> Option<Self> {
    match label.trim().to_lowercase().as_str() {
      "accumulation" | "accumulo" | "volume" | "base" => Some(Self::Accumulation),
      "intensification" | "intensificazione" | "intensity" => Some(Self::Intensification),
      "peaking" | "peak" | "realization" | "realizzazione" | "taper" | "competition" => Some(Self::Peaking),
      "deload" | "scarico" | "recovery" | "transition" => Some(Self::Deload),
      _ => None,
    }
  }
}

impl std::fmt::Display for Phase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Accumulation => write!(f, "accumulation"),
      Self::Intensification => write!(f, "intensification"),
      Self::Peaking => write!(f, "peaking"),
      Self::Deload => write!(f, "deload"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
  Beginner,
  #[default]
  Intermediate,
  Advanced,
  Elite,
}

impl ExperienceLevel {
  pub fn from_label(label: &str) -> Self {
    match label.trim().to_lowercase().as_str() {
      "beginner" | "principiante" | "novice" => Self::Beginner,
      "advanced" | "avanzato" => Self::Advanced,
      "elite" | "pro" | "professional" | "professionista" => Self::Elite,
      _ => Self::Intermediate,
    }
  }

  /// Multiplier applied to the baseline weekly-session set target
  pub fn volume_multiplier(&self) -> f64 {
    match self {
      Self::Beginner => 0.7,
      Self::Intermediate => 1.0,
      Self::Advanced => 1.2,
      Self::Elite => 1.3,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
  Strength,
  Hypertrophy,
  Power,
  Endurance,
  #[default]
  General,
}

impl Goal {
  pub fn from_label(label: &str) -> Self {
    match label.trim().to_lowercase().as_str() {
      "strength" | "forza" => Self::Strength,
      "hypertrophy" | "ipertrofia" | "muscle" | "mass" => Self::Hypertrophy,
      "power" | "potenza" | "explosiveness" => Self::Power,
      "endurance" | "resistenza" | "conditioning" => Self::Endurance,
      _ => Self::General,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
  Female,
  Male,
}

/// ---------------------------------------------------------------------------
/// Periodization & Feedback Inputs
/// ---------------------------------------------------------------------------

/// Parameters handed down by the periodization planner for this session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodizationParams {
  pub volume_pct: Option<f64>,
  pub intensity_pct: Option<f64>,
  pub phase_label: Option<String>,
}

impl PeriodizationParams {
  /// A recovery block: explicit deload/taper label or volume at 60% or less
  pub fn is_recovery(&self) -> bool {
    let labelled = self.phase_label.as_deref().is_some_and(|l| {
      let l = l.to_lowercase();
      ["deload", "recovery", "taper", "scarico"].iter().any(|k| l.contains(k))
    });
    labelled || self.volume_pct.is_some_and(|v| v <= 60.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpeTrend {
  Rising,
  Stable,
  Falling,
}

/// Prior-session aggregates supplied by the feedback store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedbackSummary {
  pub avg_rpe: Option<f64>,
  pub rpe_trend: Option<RpeTrend>,
  #[serde(default)]
  pub pain_areas: Vec<String>,
  pub compliance_pct: Option<f64>,
  #[serde(default)]
  pub sessions_completed: u32,
}

impl FeedbackSummary {
  /// Recent sessions felt hard or are getting harder
  pub fn shows_fatigue(&self) -> bool {
    self.avg_rpe.is_some_and(|r| r >= 8.5) || self.rpe_trend == Some(RpeTrend::Rising)
  }
}

/// ---------------------------------------------------------------------------
/// Athlete Context
/// ---------------------------------------------------------------------------

/// Read-only athlete and scheduling metadata. The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AthleteContext {
  #[serde(default)]
  pub athlete_id: Option<String>,
  #[serde(default)]
  pub sport: Option<Sport>,
  #[serde(default, deserialize_with = "lenient_level")]
  pub level: ExperienceLevel,
  #[serde(default, deserialize_with = "lenient_goal")]
  pub goal: Goal,
  #[serde(default)]
  pub injuries: BTreeSet<String>,
  #[serde(default, deserialize_with = "lenient_phase")]
  pub phase: Option<Phase>,
  #[serde(default)]
  pub role: Option<String>,
  #[serde(default)]
  pub age: Option<u32>,
  #[serde(default)]
  pub weight_kg: Option<f64>,
  #[serde(default)]
  pub sex: Option<Sex>,
  #[serde(default)]
  pub compliance_pct: Option<f64>,
  #[serde(default)]
  pub periodization: Option<PeriodizationParams>,
  #[serde(default)]
  pub fight_week: bool,
  /// Days relative to match day: -1 for MD-1, +1 for MD+1
  #[serde(default)]
  pub match_day_offset: Option<i32>,
  #[serde(default)]
  pub competition_date: Option<NaiveDate>,
  #[serde(default)]
  pub session_date: Option<NaiveDate>,
  #[serde(default)]
  pub feedback: Option<FeedbackSummary>,
}

impl AthleteContext {
  pub fn for_sport(sport: Sport) -> Self {
    Self {
      sport: Some(sport),
      ..Default::default()
    }
  }

  pub fn with_injury(mut self, injury: impl Into<String>) -> Self {
    self.injuries.insert(injury.into());
    self
  }

  pub fn with_phase(mut self, phase: Phase) -> Self {
    self.phase = Some(phase);
    self
  }

  pub fn with_feedback(mut self, feedback: FeedbackSummary) -> Self {
    self.feedback = Some(feedback);
    self
  }

  pub fn days_to_competition(&self) -> Option<i64> {
    match (self.competition_date, self.session_date) {
      (Some(event), Some(day)) => Some((event - day).num_days()),
      _ => None,
    }
  }

  /// Session falls right before a match or fight
  pub fn is_pre_event(&self) -> bool {
    self.fight_week
      || self.match_day_offset == Some(-1)
      || self.days_to_competition().is_some_and(|d| (0..=2).contains(&d))
  }

  /// Declared injuries plus pain areas reported in recent feedback, lowercased
  pub fn effective_injuries(&self) -> Vec<String> {
    let reported = self.feedback.iter().flat_map(|f| f.pain_areas.iter());
    let mut all: Vec<String> = self
      .injuries
      .iter()
      .chain(reported)
      .map(|i| i.trim().to_lowercase())
      .filter(|i| !i.is_empty())
      .collect();
    all.sort();
    all.dedup();
    all
  }

  /// Declared phase, else the planner's phase label
  pub fn effective_phase(&self) -> Option<Phase> {
    self.phase.or_else(|| {
      self
        .periodization
        .as_ref()
        .and_then(|p| p.phase_label.as_deref())
        .and_then(Phase::from_label)
    })
  }

  pub fn effective_compliance(&self) -> Option<f64> {
    self.compliance_pct.or_else(|| self.feedback.as_ref().and_then(|f| f.compliance_pct))
  }

  pub fn role_is(&self, keyword: &str) -> bool {
    self.role.as_deref().is_some_and(|r| r.to_lowercase().contains(keyword))
  }
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ExperienceLevel, D::Error> {
  let label = Option::<String>::deserialize(deserializer)?;
  Ok(label.map(|l| ExperienceLevel::from_label(&l)).unwrap_or_default())
}

fn lenient_goal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Goal, D::Error> {
  let label = Option::<String>::deserialize(deserializer)?;
  Ok(label.map(|l| Goal::from_label(&l)).unwrap_or_default())
}

fn lenient_phase<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Phase>, D::Error> {
  let label = Option::<String>::deserialize(deserializer)?;
  Ok(label.and_then(|l| Phase::from_label(&l)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_context_reads_italian_labels() {
    // Arrange
    let json = r#"{
      "sport": "boxe",
      "level": "principiante",
      "goal": "forza",
      "phase": "scarico",
      "injuries": ["Spalla destra"]
    }"#;

    // Act
    let ctx: AthleteContext = serde_json::from_str(json).unwrap();

    // Assert
    assert_eq!(ctx.sport, Some(Sport::Boxing));
    assert_eq!(ctx.level, ExperienceLevel::Beginner);
    assert_eq!(ctx.goal, Goal::Strength);
    assert_eq!(ctx.phase, Some(Phase::Deload));
    assert_eq!(ctx.effective_injuries(), vec!["spalla destra".to_string()]);
  }

  #[test]
  fn test_unknown_sport_is_preserved() {
    let sport = Sport::from_label("Fencing");
    assert_eq!(sport, Sport::Other("fencing".into()));
    assert!(sport.is_sport_specific());
    assert_eq!(serde_json::to_string(&sport).unwrap(), "\"fencing\"");
  }

  #[test]
  fn test_sport_resolution() {
    assert_eq!(Sport::resolve(Some(&Sport::Football), Some("boxing")), Sport::Football);
    assert_eq!(Sport::resolve(None, Some("boxing")), Sport::Boxing);
    assert_eq!(Sport::resolve(Some(&Sport::General), Some("calcio")), Sport::Football);
    assert_eq!(Sport::resolve(None, None), Sport::General);
  }

  #[test]
  fn test_days_to_competition_drives_pre_event() {
    // Arrange
    let ctx = AthleteContext {
      competition_date: NaiveDate::from_ymd_opt(2026, 3, 14),
      session_date: NaiveDate::from_ymd_opt(2026, 3, 12),
      ..Default::default()
    };

    // Assert
    assert_eq!(ctx.days_to_competition(), Some(2));
    assert!(ctx.is_pre_event());
    assert!(!AthleteContext::default().is_pre_event());
  }

  #[test]
  fn test_pain_areas_merge_into_injuries() {
    // Arrange
    let ctx = AthleteContext::default().with_injury("Knee").with_feedback(FeedbackSummary {
      pain_areas: vec!["lower back".into(), "knee".into()],
      ..Default::default()
    });

    // Assert
    assert_eq!(ctx.effective_injuries(), vec!["knee".to_string(), "lower back".to_string()]);
  }

  #[test]
  fn test_periodization_recovery_detection() {
    let taper = PeriodizationParams { phase_label: Some("Taper".into()), ..Default::default() };
    let light = PeriodizationParams { volume_pct: Some(55.0), ..Default::default() };
    let build = PeriodizationParams { volume_pct: Some(100.0), ..Default::default() };
    assert!(taper.is_recovery());
    assert!(light.is_recovery());
    assert!(!build.is_recovery());
  }
}
