//! Rule set
//!
//! Every literal table the engine consults, gathered into one immutable,
//! serde-deserializable value. The engine is handed a `RuleSet` at
//! construction and never mutates it; overrides come in as JSON (see
//! `config`) and inherit any table they omit from the defaults below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classifier::{self, ClassificationRow, PatternProfile, SessionMarkers};
use crate::fixed_params::{self, FixedParams, StrengthRestGuide, SupersetRest};
use crate::models::{Category, ExerciseEntry, ExerciseType, MovementPattern};

/// Stimulus-to-fatigue rating used for patterns without a profile
pub const DEFAULT_SFR: u8 = 5;

/// ---------------------------------------------------------------------------
/// Scoring Constants
/// ---------------------------------------------------------------------------

/// Relative weight of each category in the overall score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
  pub volume: f64,
  pub sequencing: f64,
  pub biomechanics: f64,
  pub sport_specificity: f64,
  pub safety: f64,
  pub context: f64,
  pub sfr: f64,
  pub advanced_science: f64,
}

impl Default for CategoryWeights {
  fn default() -> Self {
    Self {
      volume: 10.0,
      sequencing: 8.0,
      biomechanics: 10.0,
      sport_specificity: 20.0,
      safety: 18.0,
      context: 8.0,
      sfr: 10.0,
      advanced_science: 16.0,
    }
  }
}

impl CategoryWeights {
  pub fn weight(&self, category: Category) -> f64 {
    match category {
      Category::Volume => self.volume,
      Category::Sequencing => self.sequencing,
      Category::Biomechanics => self.biomechanics,
      Category::SportSpecificity => self.sport_specificity,
      Category::Safety => self.safety,
      Category::Context => self.context,
      Category::Sfr => self.sfr,
      Category::AdvancedScience => self.advanced_science,
    }
  }

  pub fn total(&self) -> f64 {
    Category::ALL.iter().map(|c| self.weight(*c)).sum()
  }
}

/// ---------------------------------------------------------------------------
/// Volume Scaling
/// ---------------------------------------------------------------------------

/// Minimum set count a scaling pass may reduce an entry to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetFloors {
  pub compound: u32,
  pub round_based: u32,
  pub accessory: u32,
  pub other: u32,
}

impl Default for SetFloors {
  fn default() -> Self {
    Self {
      compound: 2,
      round_based: 2,
      accessory: 1,
      other: 2,
    }
  }
}

/// Set counts strength work is raised to outside low-intensity sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthMinimums {
  /// Name fragments that mark a main compound lift
  pub main_keywords: Vec<String>,
  pub main_sets: u32,
  pub accessory_sets: u32,
}

impl Default for StrengthMinimums {
  fn default() -> Self {
    Self {
      main_keywords: [
        "back squat",
        "front squat",
        "deadlift",
        "trap bar",
        "bench press",
        "overhead press",
        "military press",
        "barbell row",
      ]
      .iter()
      .map(|s| s.to_string())
      .collect(),
      main_sets: 3,
      accessory_sets: 2,
    }
  }
}

/// Round ceiling for one sport drill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCap {
  pub id: String,
  pub sport: String,
  pub keywords: Vec<String>,
  /// More rounds than this are cut back to `reduced_to`
  pub max_rounds: u32,
  pub reduced_to: u32,
}

impl RoundCap {
  fn new(id: &str, sport: &str, keywords: &[&str], max_rounds: u32, reduced_to: u32) -> Self {
    Self {
      id: id.into(),
      sport: sport.into(),
      keywords: keywords.iter().map(|s| s.to_string()).collect(),
      max_rounds,
      reduced_to,
    }
  }
}

pub fn default_round_caps() -> Vec<RoundCap> {
  vec![
    RoundCap::new("shadow_boxing_rounds", "boxing", &["shadow box", "shadowbox"], 4, 3),
    RoundCap::new("heavy_bag_rounds", "boxing", &["heavy bag"], 4, 3),
    RoundCap::new("boxing_circuit_rounds", "boxing", &["boxing circuit"], 6, 4),
  ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeRules {
  /// Percentage removed from every working entry in low-intensity sessions
  pub deload_reduction_pct: f64,
  pub floors: SetFloors,
  pub low_intensity_exercise_cap: usize,
  /// Periodization recovery blocks cap sets per entry at this value
  pub recovery_set_cap: u32,
  pub high_intensity_pct: f64,
  /// Strength entries at or above this many reps get `high_intensity_reps`
  /// when periodization intensity is high
  pub high_intensity_rep_floor: u32,
  pub high_intensity_reps: String,
  pub low_compliance_pct: f64,
  pub halve_from_sets: u32,
  pub reduce_from_sets: u32,
  pub reduce_factor: f64,
  pub accumulation_conditioning_minutes: f64,
  pub accumulation_conditioning_min_sets: u32,
  pub accumulation_conditioning_factor: f64,
  pub accumulation_conditioning_floor: u32,
  pub strength_minimums: StrengthMinimums,
  pub round_caps: Vec<RoundCap>,
}

impl Default for VolumeRules {
  fn default() -> Self {
    Self {
      deload_reduction_pct: 30.0,
      floors: SetFloors::default(),
      low_intensity_exercise_cap: 6,
      recovery_set_cap: 3,
      high_intensity_pct: 85.0,
      high_intensity_rep_floor: 8,
      high_intensity_reps: "3-5".into(),
      low_compliance_pct: 70.0,
      halve_from_sets: 8,
      reduce_from_sets: 5,
      reduce_factor: 0.7,
      accumulation_conditioning_minutes: 40.0,
      accumulation_conditioning_min_sets: 8,
      accumulation_conditioning_factor: 0.6,
      accumulation_conditioning_floor: 4,
      strength_minimums: StrengthMinimums::default(),
      round_caps: default_round_caps(),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Session Limits
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLimits {
  pub min_warmup_minutes: f64,
  pub boxing_min_rounds: u32,
  pub boxing_rounds_warning: u32,
  pub max_rounds: u32,
  pub neck_min_directions: usize,
  pub neck_directions: BTreeMap<String, Vec<String>>,
  pub pattern_ceilings: BTreeMap<MovementPattern, u32>,
  pub max_conditioning_blocks: usize,
  pub main_exercises_min: usize,
  pub main_exercises_max: usize,
  pub duration_warning_minutes: u32,
  pub duration_split_minutes: u32,
  pub max_strength_exercises: usize,
  /// Share of working sets one pattern may hold before it reads as skewed
  pub skew_share: f64,
}

impl Default for SessionLimits {
  fn default() -> Self {
    let directions = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Self {
      min_warmup_minutes: 8.0,
      boxing_min_rounds: 4,
      boxing_rounds_warning: 10,
      max_rounds: 12,
      neck_min_directions: 2,
      neck_directions: BTreeMap::from([
        ("flexion".to_string(), directions(&["flexion", "curl", "front"])),
        ("extension".to_string(), directions(&["extension", "back", "bridge"])),
        ("lateral".to_string(), directions(&["lateral", "side"])),
        ("rotation".to_string(), directions(&["rotation"])),
      ]),
      pattern_ceilings: BTreeMap::from([(MovementPattern::Squat, 2), (MovementPattern::Hinge, 2)]),
      max_conditioning_blocks: 2,
      main_exercises_min: 4,
      main_exercises_max: 10,
      duration_warning_minutes: 75,
      duration_split_minutes: 90,
      max_strength_exercises: 5,
      skew_share: 0.5,
    }
  }
}

impl SessionLimits {
  /// Distinct neck directions named across the given entries. A neck entry
  /// naming no direction counts as one general direction.
  pub fn neck_direction_count<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> usize {
    let mut found: Vec<&str> = Vec::new();
    for name in names {
      let lower = name.to_lowercase();
      let mut named_any = false;
      for (direction, keywords) in &self.neck_directions {
        if keywords.iter().any(|k| lower.contains(k.as_str())) {
          named_any = true;
          if !found.contains(&direction.as_str()) {
            found.push(direction);
          }
        }
      }
      if !named_any && !found.contains(&"general") {
        found.push("general");
      }
    }
    found.len()
  }
}

/// Exercises that must not share a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForbiddenCombination {
  pub id: String,
  /// Each group must be matched by a different entry
  pub groups: Vec<Vec<String>>,
  /// Only entries prescribed heavy (strength, five reps or fewer) count
  #[serde(default)]
  pub heavy_only: bool,
  pub message: String,
  pub fix: String,
}

fn default_forbidden_combinations() -> Vec<ForbiddenCombination> {
  let group = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
  vec![
    ForbiddenCombination {
      id: "forbidden_combo_front_back_squat".into(),
      groups: vec![group(&["front squat"]), group(&["back squat"])],
      heavy_only: false,
      message: "Front squat and back squat in the same session".into(),
      fix: "Keep one squat variation and move the other to another day".into(),
    },
    ForbiddenCombination {
      id: "forbidden_combo_deadlift_variants".into(),
      groups: vec![
        group(&["conventional deadlift"]),
        group(&["trap bar deadlift", "hex bar deadlift"]),
      ],
      heavy_only: false,
      message: "Conventional and trap-bar deadlift in the same session".into(),
      fix: "Pick one deadlift variation".into(),
    },
    ForbiddenCombination {
      id: "forbidden_combo_heavy_squat_deadlift".into(),
      groups: vec![group(&["squat"]), group(&["deadlift", "stacco"])],
      heavy_only: true,
      message: "Heavy squats and heavy deadlifts in the same session overload the lower back".into(),
      fix: "Keep one heavy lower-body lift; drop the other to 8+ reps or another day".into(),
    },
  ]
}

/// ---------------------------------------------------------------------------
/// Naming Templates
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VagueRule {
  /// Regex matched against the normalized name
  pub pattern: String,
  pub template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTemplate {
  pub keyword: String,
  /// `{name}` is replaced with the original name
  pub template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingRules {
  /// Normalized vague name -> fully specified protocol
  pub exact: BTreeMap<String, String>,
  pub vague: Vec<VagueRule>,
  /// Words that make a short name specific enough to keep
  pub acceptable: Vec<String>,
  pub max_expand_words: usize,
  pub sport_expansions: BTreeMap<String, Vec<KeywordTemplate>>,
  pub round_based_expansion: String,
  pub type_expansions: BTreeMap<ExerciseType, String>,
  pub fallback_expansion: String,
}

impl Default for NamingRules {
  fn default() -> Self {
    let warmup = "Dynamic Warm-up: 10min (joint circles, leg swings, hip openers, band pull-aparts)";
    let cooldown = "Cool-down: 8min (easy walk + static stretching: hamstrings, hip flexors, shoulders)";
    let metcon = "MetCon: 4x (10 Burpees + 15 KB Swings + 10 Box Jumps) - 90s rest";
    let core = "Pallof Press: 3x10/side + Dead Bug: 3x8/side";

    let exact: BTreeMap<String, String> = [
      ("warm up", warmup),
      ("warmup", warmup),
      ("riscaldamento", warmup),
      ("cool down", cooldown),
      ("cooldown", cooldown),
      ("stretching", cooldown),
      ("defaticamento", cooldown),
      ("cardio", "Zone 2 Cardio: 20min steady (conversational pace, 120-140 bpm)"),
      ("conditioning", metcon),
      ("conditioning circuit", metcon),
      ("metcon", metcon),
      ("bag work", "Heavy Bag: 5x3min (power combos, 1-2-3, body-head) - 1min rest"),
      ("heavy bag", "Heavy Bag: 5x3min (power combos, 1-2-3, body-head) - 1min rest"),
      ("shadow boxing", "Shadow Boxing: 3x3min (footwork, jab-cross, slips) - 1min rest"),
      ("jump rope", "Jump Rope: 3x3min (alternate footwork, 30s fast / 30s easy) - 1min rest"),
      ("core", core),
      ("core work", core),
      ("abs", core),
      ("mobility", "Mobility Flow: 10min (hip 90/90, thoracic rotations, ankle rocks)"),
      ("sprint", "Sprints: 6x (30m acceleration, walk-back recovery) - 90s rest"),
      ("sprints", "Sprints: 6x (30m acceleration, walk-back recovery) - 90s rest"),
      ("plyo", "Box Jumps: 4x5 (step down, full reset) - 2min rest"),
      ("plyometrics", "Box Jumps: 4x5 (step down, full reset) - 2min rest"),
      ("agility", "Agility Ladder: 4x (in-out, lateral shuffle, icky shuffle) - 60s rest"),
      ("hiit", "HIIT: 8x (20s all-out / 40s easy) on bike"),
      ("finisher", "Finisher: 3x (10 Burpees + 20 Mountain Climbers) - 60s rest"),
      ("strength", "Back Squat: 4x5 @ RPE 8 - 3min rest"),
      ("strength training", "Back Squat: 4x5 @ RPE 8 - 3min rest"),
      ("power", "Hang Power Clean: 5x3 @ 70% - 2min rest"),
      ("upper body", "Upper Body: Bench Press 4x8 + Barbell Row 4x8"),
      ("lower body", "Lower Body: Back Squat 4x6 + Romanian Deadlift 3x8"),
      ("leg day", "Lower Body: Back Squat 4x6 + Romanian Deadlift 3x8"),
      ("full body", "Full Body: Goblet Squat 3x10 + Push-up 3x12 + Dumbbell Row 3x10"),
      ("push day", "Push: Bench Press 4x8 + Overhead Press 3x8"),
      ("pull day", "Pull: Pull-up 4x6 + Barbell Row 4x8"),
      ("arms", "Arms: Dumbbell Curl 3x12 + Triceps Pushdown 3x12"),
      ("technique", "Technique Drills: 4x3min (focused skill work, full recovery)"),
      ("skill work", "Technique Drills: 4x3min (focused skill work, full recovery)"),
      ("recovery", "Recovery Flow: 10min (foam rolling + easy breathing)"),
      ("prehab", "Prehab: Band External Rotation 2x15 + Face Pull 2x15"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let vague = [
      (r"^(?:general |light |easy )?cardio(?: work| session)?$", "Zone 2 Cardio: 20min steady (conversational pace, 120-140 bpm)"),
      (r"^(?:boxing |general )?conditioning(?: block| work)?$", metcon),
      (r"^(?:core|abs?)(?: stability| training| circuit)?$", core),
      (r"^(?:general )?strength(?: work| block)?$", "Back Squat: 4x5 @ RPE 8 - 3min rest"),
      (r"^(?:light )?stretch(?:es|ing)?$", cooldown),
      (r"^(?:general )?warm ?ups?(?: drills)?$", warmup),
    ]
    .into_iter()
    .map(|(p, t)| VagueRule { pattern: p.to_string(), template: t.to_string() })
    .collect();

    let acceptable = [
      "squat", "deadlift", "press", "bench", "row", "pull up", "chin up", "lunge", "curl", "plank", "dip",
      "clean", "snatch", "thrust", "bridge", "raise", "extension", "fly", "pulldown", "carry", "swing",
      "jump", "nordic", "pallof", "twist", "crunch", "push up", "rdl", "burpee", "sprint", "neck",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let keyword = |k: &str, t: &str| KeywordTemplate { keyword: k.to_string(), template: t.to_string() };
    let sport_expansions = BTreeMap::from([
      (
        "boxing".to_string(),
        vec![
          keyword("bag", "{name}: 5x3min (power combos) - 1min rest"),
          keyword("shadow", "{name}: 3x3min (footwork, jab-cross, slips) - 1min rest"),
          keyword("rope", "{name}: 3x3min (alternate footwork) - 1min rest"),
          keyword("pad", "{name}: 4x3min (coach-fed combos) - 1min rest"),
          keyword("footwork", "{name}: 3x3min (angles, pivots, in-out) - 1min rest"),
          keyword("defense", "{name}: 3x3min (slips, rolls, parries) - 1min rest"),
        ],
      ),
      (
        "football".to_string(),
        vec![
          keyword("sprint", "{name}: 6x (30m, full recovery) - 90s rest"),
          keyword("agility", "{name}: 4x (5-10-5 shuttle) - 60s rest"),
          keyword("rondo", "{name}: 4x3min (4v2, two-touch) - 1min rest"),
        ],
      ),
      (
        "basketball".to_string(),
        vec![
          keyword("shooting", "{name}: 5x (10 makes from each spot) - 60s rest"),
          keyword("agility", "{name}: 4x (defensive slides, closeouts) - 60s rest"),
        ],
      ),
    ]);

    let type_expansions = BTreeMap::from([
      (ExerciseType::Conditioning, "{name}: 3x8-10 (explosive, full recovery)".to_string()),
      (ExerciseType::Strength, "{name}: 4x6-8 @ RPE 8 (controlled tempo 2-0-2)".to_string()),
      (ExerciseType::Power, "{name}: 5x3 (maximal intent, full recovery)".to_string()),
      (ExerciseType::Hypertrophy, "{name}: 3x10-12 @ RPE 7".to_string()),
      (ExerciseType::Technique, "{name}: 4x3min (focused technical work) - 1min rest".to_string()),
    ]);

    Self {
      exact,
      vague,
      acceptable,
      max_expand_words: 3,
      sport_expansions,
      round_based_expansion: "{name}: 4x3min work / 1min rest".into(),
      type_expansions,
      fallback_expansion: "{name}: 3x10-12 (adjust load as needed)".into(),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Structural Templates
/// ---------------------------------------------------------------------------

/// An entry the corrector may insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTemplate {
  pub name: String,
  pub sets: u32,
  pub reps: String,
  #[serde(default)]
  pub rest: Option<String>,
  #[serde(rename = "type")]
  pub exercise_type: ExerciseType,
}

impl EntryTemplate {
  fn new(name: &str, sets: u32, reps: &str, rest: Option<&str>, exercise_type: ExerciseType) -> Self {
    Self {
      name: name.to_string(),
      sets,
      reps: reps.to_string(),
      rest: rest.map(String::from),
      exercise_type,
    }
  }

  pub fn to_entry(&self) -> ExerciseEntry {
    ExerciseEntry {
      name: self.name.clone(),
      sets: Some(self.sets),
      reps: self.reps.clone(),
      rest: self.rest.clone(),
      exercise_type: self.exercise_type,
      notes: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureTemplates {
  pub warmup: EntryTemplate,
  pub cooldown: EntryTemplate,
  pub consolidated_warmup_name: String,
  pub consolidated_warmup_reps: String,
  /// Reps written into a warm-up that falls short of the minimum
  pub minimum_warmup_reps: String,
}

impl Default for StructureTemplates {
  fn default() -> Self {
    Self {
      warmup: EntryTemplate::new(
        "Dynamic Warm-up: 10min (joint circles, leg swings, hip openers, band pull-aparts)",
        1,
        "10 min",
        None,
        ExerciseType::Warmup,
      ),
      cooldown: EntryTemplate::new(
        "Cool-down: 8min (easy walk + static stretching: hamstrings, hip flexors, shoulders)",
        1,
        "8 min",
        None,
        ExerciseType::Cooldown,
      ),
      consolidated_warmup_name: "Dynamic Warm-up & Mobility".into(),
      consolidated_warmup_reps: "12 min".into(),
      minimum_warmup_reps: "10 min".into(),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Sport Requirements
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
  /// Right after the first strength entry; before the cool-down if there is none
  AfterFirstStrength,
  BeforeCooldown,
}

/// When a sport requirement counts as met
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementMinimum {
  /// One matching entry
  #[default]
  Present,
  /// Round-based work totalling `limits.boxing_min_rounds`
  Rounds,
  /// `limits.neck_min_directions` distinct neck directions
  NeckDirections,
}

/// An element a sport mandates in every session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportRequirement {
  pub sport: String,
  pub id: String,
  /// Any entry whose name contains one of these satisfies the requirement
  #[serde(default)]
  pub keywords: Vec<String>,
  /// Any entry classified as one of these satisfies the requirement
  #[serde(default)]
  pub patterns: Vec<MovementPattern>,
  #[serde(default)]
  pub minimum: RequirementMinimum,
  #[serde(default)]
  pub skip_low_intensity: bool,
  pub position: InsertPosition,
  pub entry: EntryTemplate,
}

fn default_sport_requirements() -> Vec<SportRequirement> {
  let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
  vec![
    SportRequirement {
      sport: "football".into(),
      id: "hamstring_prevention".into(),
      keywords: words(&["hamstring", "nordic", "rdl", "romanian", "leg curl", "glute ham"]),
      patterns: vec![MovementPattern::KneeFlexion],
      minimum: RequirementMinimum::Present,
      skip_low_intensity: true,
      position: InsertPosition::AfterFirstStrength,
      entry: EntryTemplate::new(
        "Nordic Hamstring Curl: 3x5 (partner-assisted, slow eccentric)",
        3,
        "5",
        Some("90s"),
        ExerciseType::Strength,
      ),
    },
    SportRequirement {
      sport: "boxing".into(),
      id: "round_based_work".into(),
      keywords: vec![],
      patterns: vec![
        MovementPattern::BoxingBag,
        MovementPattern::BoxingTechnique,
        MovementPattern::BoxingConditioning,
      ],
      minimum: RequirementMinimum::Rounds,
      skip_low_intensity: false,
      position: InsertPosition::BeforeCooldown,
      entry: EntryTemplate::new(
        "Shadow Boxing: 4x3min (R1 footwork + jab, R2 add cross, R3 hooks + slips, R4 freestyle) - 1min rest",
        4,
        "3 minutes",
        Some("60s"),
        ExerciseType::Technique,
      ),
    },
    SportRequirement {
      sport: "boxing".into(),
      id: "neck_protocol".into(),
      keywords: words(&["neck"]),
      patterns: vec![MovementPattern::Neck],
      minimum: RequirementMinimum::NeckDirections,
      skip_low_intensity: false,
      position: InsertPosition::BeforeCooldown,
      entry: EntryTemplate::new(
        "Neck Strengthening: Flexion 2x15 + Extension 2x15 + Lateral Flexion 2x12/side",
        2,
        "15",
        Some("30s"),
        ExerciseType::Hypertrophy,
      ),
    },
  ]
}

/// ---------------------------------------------------------------------------
/// Contraindications
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contraindication {
  pub id: String,
  /// Matched as substrings of the declared injury text
  pub injury_keywords: Vec<String>,
  #[serde(default)]
  pub avoid_keywords: Vec<String>,
  #[serde(default)]
  pub avoid_patterns: Vec<MovementPattern>,
  /// Percentage of the remaining safety score removed per violation
  pub penalty: f64,
  pub reason: String,
}

fn default_contraindications() -> Vec<Contraindication> {
  let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
  let rule = |id: &str, injuries: &[&str], avoid: &[&str], patterns: &[MovementPattern], penalty: f64, reason: &str| {
    Contraindication {
      id: id.to_string(),
      injury_keywords: words(injuries),
      avoid_keywords: words(avoid),
      avoid_patterns: patterns.to_vec(),
      penalty,
      reason: reason.to_string(),
    }
  };
  use MovementPattern::*;
  vec![
    rule(
      "shoulder",
      &["shoulder", "spalla", "rotator", "impingement"],
      &["overhead press", "military press", "behind the neck", "upright row", "dip", "snatch", "kipping"],
      &[VerticalPush],
      30.0,
      "loaded overhead and end-range shoulder work",
    ),
    rule(
      "lumbar",
      &["lumbar", "lombare", "disc", "sciatica"],
      &["good morning", "back squat", "sit up", "russian twist"],
      &[Hinge],
      30.0,
      "spinal loading and loaded flexion",
    ),
    rule(
      "hernia",
      &["hernia", "ernia"],
      &["deadlift", "back squat", "leg press", "sit up", "heavy"],
      &[],
      35.0,
      "high intra-abdominal pressure",
    ),
    rule(
      "back",
      &["back", "schiena"],
      &["deadlift", "good morning", "bent over row", "back squat"],
      &[],
      25.0,
      "axial loading of the spine",
    ),
    rule(
      "acl",
      &["acl", "lca", "cruciate", "crociato"],
      &["pivot", "cutting", "depth jump", "leg extension"],
      &[Plyometric],
      30.0,
      "uncontrolled landing and shear on the knee",
    ),
    rule(
      "knee",
      &["knee", "ginocchio", "patellar", "menisc"],
      &["leg extension", "deep squat", "sissy squat", "pistol"],
      &[Plyometric],
      25.0,
      "deep knee flexion under load and impact",
    ),
    rule(
      "hamstring",
      &["hamstring", "ischio"],
      &["sprint", "rdl", "romanian", "good morning", "kick"],
      &[],
      25.0,
      "high-velocity or long-length hamstring loading",
    ),
    rule(
      "ankle",
      &["ankle", "caviglia", "achilles"],
      &["jump rope", "sprint", "agility", "ladder", "skipping"],
      &[Plyometric],
      20.0,
      "repeated impact on the ankle",
    ),
    rule(
      "wrist",
      &["wrist", "polso", "hand"],
      &["push up", "front squat", "clean", "heavy bag"],
      &[BoxingBag],
      15.0,
      "loaded wrist extension and impact",
    ),
    rule(
      "neck",
      &["neck", "collo", "cervical"],
      &["sparring", "wrestler bridge", "shrug", "behind the neck"],
      &[Neck],
      20.0,
      "direct cervical loading",
    ),
  ]
}

fn default_prehab_keywords() -> Vec<String> {
  [
    "prehab", "activation", "band", "face pull", "external rotation", "isometric", "nordic", "copenhagen",
    "corrective", "rehab", "tibialis", "mobility",
  ]
  .into_iter()
  .map(String::from)
  .collect()
}

/// ---------------------------------------------------------------------------
/// Rule Set
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
  pub classification: Vec<ClassificationRow>,
  pub profiles: BTreeMap<MovementPattern, PatternProfile>,
  pub markers: SessionMarkers,
  pub fixed_parameters: BTreeMap<MovementPattern, FixedParams>,
  pub strength_rest: StrengthRestGuide,
  pub superset_rest: SupersetRest,
  pub weights: CategoryWeights,
  /// Floors for A+, A, B, C, D; anything lower is F
  pub grade_bands: [u8; 5],
  pub volume: VolumeRules,
  pub limits: SessionLimits,
  pub forbidden_combinations: Vec<ForbiddenCombination>,
  pub naming: NamingRules,
  pub structure: StructureTemplates,
  pub sport_requirements: Vec<SportRequirement>,
  pub contraindications: Vec<Contraindication>,
  pub prehab_keywords: Vec<String>,
}

impl Default for RuleSet {
  fn default() -> Self {
    Self {
      classification: classifier::default_rows(),
      profiles: classifier::default_profiles(),
      markers: SessionMarkers::default(),
      fixed_parameters: fixed_params::default_table(),
      strength_rest: StrengthRestGuide::default(),
      superset_rest: SupersetRest::default(),
      weights: CategoryWeights::default(),
      grade_bands: [90, 80, 70, 60, 50],
      volume: VolumeRules::default(),
      limits: SessionLimits::default(),
      forbidden_combinations: default_forbidden_combinations(),
      naming: NamingRules::default(),
      structure: StructureTemplates::default(),
      sport_requirements: default_sport_requirements(),
      contraindications: default_contraindications(),
      prehab_keywords: default_prehab_keywords(),
    }
  }
}

impl RuleSet {
  pub fn fixed(&self, pattern: MovementPattern) -> Option<&FixedParams> {
    self.fixed_parameters.get(&pattern)
  }

  pub fn profile(&self, pattern: MovementPattern) -> Option<&PatternProfile> {
    self.profiles.get(&pattern)
  }

  pub fn sfr(&self, pattern: MovementPattern) -> u8 {
    self.profile(pattern).map(|p| p.sfr).unwrap_or(DEFAULT_SFR)
  }

  pub fn requirements_for<'a>(&'a self, sport_key: &'a str) -> impl Iterator<Item = &'a SportRequirement> + 'a {
    self.sport_requirements.iter().filter(move |r| r.sport == sport_key)
  }
}
