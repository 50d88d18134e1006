use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::prescription::{name_minutes, parse_rest_seconds, RepsSpec};

/// ---------------------------------------------------------------------------
/// Exercise Type
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
  Warmup,
  Strength,
  Hypertrophy,
  Power,
  Conditioning,
  Technique,
  Cooldown,
  #[default]
  Unknown,
}

impl ExerciseType {
  /// Lenient mapping used when reading generator output.
  /// Unrecognized labels become `Unknown` rather than an error.
  pub fn from_label(label: &str) -> Self {
    let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
    match normalized.as_str() {
      "warmup" | "warm_up" | "activation" | "riscaldamento" => Self::Warmup,
      "strength" | "forza" | "compound" => Self::Strength,
      "hypertrophy" | "ipertrofia" | "accessory" => Self::Hypertrophy,
      "power" | "potenza" | "plyometric" | "explosive" => Self::Power,
      "conditioning" | "cardio" | "condizionamento" | "metabolic" => Self::Conditioning,
      "technique" | "skill" | "tecnica" | "drill" => Self::Technique,
      "cooldown" | "cool_down" | "recovery" | "defaticamento" => Self::Cooldown,
      _ => Self::Unknown,
    }
  }
}

impl std::fmt::Display for ExerciseType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Warmup => write!(f, "warmup"),
      Self::Strength => write!(f, "strength"),
      Self::Hypertrophy => write!(f, "hypertrophy"),
      Self::Power => write!(f, "power"),
      Self::Conditioning => write!(f, "conditioning"),
      Self::Technique => write!(f, "technique"),
      Self::Cooldown => write!(f, "cooldown"),
      Self::Unknown => write!(f, "unknown"),
    }
  }
}

impl std::str::FromStr for ExerciseType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "warmup" => Ok(Self::Warmup),
      "strength" => Ok(Self::Strength),
      "hypertrophy" => Ok(Self::Hypertrophy),
      "power" => Ok(Self::Power),
      "conditioning" => Ok(Self::Conditioning),
      "technique" => Ok(Self::Technique),
      "cooldown" => Ok(Self::Cooldown),
      "unknown" => Ok(Self::Unknown),
      _ => Err(format!("Unknown exercise type: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Entry
/// ---------------------------------------------------------------------------

/// One prescribed movement as produced by the upstream generator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExerciseEntry {
  #[serde(default, deserialize_with = "lenient_text")]
  pub name: String,
  #[serde(default, deserialize_with = "lenient_sets")]
  pub sets: Option<u32>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub reps: String,
  #[serde(default, deserialize_with = "lenient_rest")]
  pub rest: Option<String>,
  #[serde(rename = "type", default, deserialize_with = "lenient_type")]
  pub exercise_type: ExerciseType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

impl ExerciseEntry {
  pub fn new(name: impl Into<String>, sets: Option<u32>, reps: impl Into<String>, exercise_type: ExerciseType) -> Self {
    Self {
      name: name.into(),
      sets,
      reps: reps.into(),
      rest: None,
      exercise_type,
      notes: None,
    }
  }

  pub fn with_rest(mut self, rest: impl Into<String>) -> Self {
    self.rest = Some(rest.into());
    self
  }

  pub fn has_name(&self) -> bool {
    !self.name.trim().is_empty()
  }

  pub fn reps_spec(&self) -> RepsSpec {
    RepsSpec::parse(&self.reps)
  }

  pub fn rest_seconds(&self) -> Option<u32> {
    self.rest.as_deref().and_then(parse_rest_seconds)
  }

  /// Set count with a missing value read as zero
  pub fn set_count(&self) -> u32 {
    self.sets.unwrap_or(0)
  }

  /// Rough wall-clock seconds for this entry
  pub fn estimated_seconds(&self) -> u32 {
    let sets = self.sets.unwrap_or(3).max(1);
    let work = self.reps_spec().work_seconds();
    let rest = self.rest_seconds().unwrap_or(60);
    sets.saturating_mul(work).saturating_add((sets - 1).saturating_mul(rest))
  }

  /// Minutes of work: timed reps first, then minutes written in the name,
  /// then the wall-clock estimate
  pub fn prescribed_minutes(&self) -> f64 {
    match self.reps_spec() {
      RepsSpec::Duration { seconds } => seconds as f64 * self.sets.unwrap_or(1).max(1) as f64 / 60.0,
      _ => name_minutes(&self.name)
        .map(f64::from)
        .unwrap_or_else(|| self.estimated_seconds() as f64 / 60.0),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Volume Scaling Stamp
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingPass {
  PreScaling,
  PhaseScaling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingRecord {
  pub pass: ScalingPass,
  pub reason: String,
}

/// Marks which volume passes already ran over a session so a second
/// correction run does not scale the same sets again.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VolumeScaling {
  pub applied: Vec<ScalingRecord>,
}

impl VolumeScaling {
  pub fn has(&self, pass: ScalingPass) -> bool {
    self.applied.iter().any(|r| r.pass == pass)
  }
}

/// ---------------------------------------------------------------------------
/// Session
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
  #[serde(default, deserialize_with = "lenient_text")]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sport: Option<String>,
  #[serde(default)]
  pub exercises: Vec<ExerciseEntry>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub estimated_duration_minutes: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub volume_scaling: Option<VolumeScaling>,
}

impl Session {
  pub fn new(title: impl Into<String>, exercises: Vec<ExerciseEntry>) -> Self {
    Self {
      title: title.into(),
      exercises,
      ..Default::default()
    }
  }

  pub fn with_sport(mut self, sport: impl Into<String>) -> Self {
    self.sport = Some(sport.into());
    self
  }

  pub fn scaled_by(&self, pass: ScalingPass) -> bool {
    self.volume_scaling.as_ref().is_some_and(|v| v.has(pass))
  }

  pub fn stamp_scaling(&mut self, pass: ScalingPass, reason: impl Into<String>) {
    let stamp = self.volume_scaling.get_or_insert_with(VolumeScaling::default);
    if !stamp.has(pass) {
      stamp.applied.push(ScalingRecord { pass, reason: reason.into() });
    }
  }

  /// Declared duration, or an estimate from the entries
  pub fn estimated_minutes(&self) -> u32 {
    if let Some(declared) = self.estimated_duration_minutes {
      return declared;
    }
    let seconds = self
      .exercises
      .iter()
      .map(ExerciseEntry::estimated_seconds)
      .fold(0u32, u32::saturating_add);
    (seconds as f64 / 60.0).round() as u32
  }

  pub fn total_sets(&self) -> u32 {
    self.exercises.iter().map(ExerciseEntry::set_count).fold(0u32, u32::saturating_add)
  }
}

/// ---------------------------------------------------------------------------
/// Lenient Field Readers
/// ---------------------------------------------------------------------------

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::String(s)) => s,
    Some(Value::Number(n)) => n.to_string(),
    _ => String::new(),
  })
}

fn lenient_sets<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
  let value = Option::<Value>::deserialize(deserializer)?;
  let number = match value {
    Some(Value::Number(n)) => n.as_f64(),
    Some(Value::String(s)) => leading_number(&s),
    _ => None,
  };
  Ok(number.filter(|n| n.is_finite() && *n >= 0.5).map(|n| n.round() as u32))
}

fn lenient_rest<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => Some(format!("{}s", n)),
    Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
    _ => None,
  })
}

fn lenient_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ExerciseType, D::Error> {
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::String(s)) => ExerciseType::from_label(&s),
    _ => ExerciseType::Unknown,
  })
}

fn leading_number(text: &str) -> Option<f64> {
  let digits: String = text.trim().chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
  digits.parse().ok()
}
