//! Pattern classifier
//!
//! Maps free-text exercise names onto the movement-pattern taxonomy by
//! walking an ordered table of keyword rows: first match wins, and each row
//! may carry excludes that veto the match ("jump squat" is plyometric, not
//! squat). The table is plain data; this module only compiles it.
//!
//! Also owns the session-role markers (warm-up, cool-down) and the
//! per-call `SessionView` that validator and scorer read from.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigError;
use crate::fixed_params::FixedParams;
use crate::models::{AthleteContext, ExerciseEntry, ExerciseType, MovementPattern, Session, Sport};
use crate::prescription::RepsSpec;
use crate::rules::RuleSet;

/// ---------------------------------------------------------------------------
/// Table Records
/// ---------------------------------------------------------------------------

/// One classification row. Rows are tried in table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRow {
  pub pattern: MovementPattern,
  pub keywords: Vec<String>,
  #[serde(default)]
  pub excludes: Vec<String>,
}

impl ClassificationRow {
  fn new(pattern: MovementPattern, keywords: &[&str], excludes: &[&str]) -> Self {
    Self {
      pattern,
      keywords: keywords.iter().map(|k| k.to_string()).collect(),
      excludes: excludes.iter().map(|k| k.to_string()).collect(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
  Upper,
  Lower,
  Core,
  Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Balance {
  Push,
  Pull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
  Anterior,
  Posterior,
}

/// What a pattern trains and how costly it is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternProfile {
  pub muscles: Vec<String>,
  /// Stimulus-to-fatigue rating, 1-10
  pub sfr: u8,
  #[serde(default)]
  pub compound: bool,
  pub region: Region,
  #[serde(default)]
  pub balance: Option<Balance>,
  #[serde(default)]
  pub chain: Option<Chain>,
}

/// Keyword lists that decide an entry's role in the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionMarkers {
  pub warmup: Vec<String>,
  pub warmup_excludes: Vec<String>,
  pub cooldown: Vec<String>,
  /// Cool-down words that win over any warm-up word in the same name
  pub explicit_cooldown: Vec<String>,
  pub unilateral: Vec<String>,
  pub low_intensity: Vec<String>,
}

impl Default for SessionMarkers {
  fn default() -> Self {
    let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Self {
      warmup: words(&[
        "warm up",
        "warmup",
        "activation",
        "mobility",
        "dynamic",
        "prep",
        "preparation",
        "riscaldamento",
      ]),
      warmup_excludes: words(&["shadow", "cool", "static stretch", "sparring"]),
      cooldown: words(&[
        "cool down",
        "cooldown",
        "static stretch",
        "stretching",
        "foam roll",
        "recovery",
        "breathing",
        "defaticamento",
      ]),
      explicit_cooldown: words(&["cool down", "cooldown", "static stretch", "defaticamento"]),
      unilateral: words(&[
        "single leg",
        "single arm",
        "one arm",
        "one leg",
        "split squat",
        "lunge",
        "step up",
        "bulgarian",
        "pistol",
        "unilateral",
        "side",
        "each",
        "copenhagen",
      ]),
      low_intensity: words(&["deload", "light", "recovery", "scarico", "low intensity", "rpe 5 6", "rpe 5"]),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Default Tables
/// ---------------------------------------------------------------------------

pub fn default_rows() -> Vec<ClassificationRow> {
  use MovementPattern::*;
  vec![
    ClassificationRow::new(
      Mobility,
      &[
        "warm up", "warmup", "mobility", "dynamic", "activation", "cool down", "cooldown", "stretch",
        "foam roll", "recovery flow", "breathing", "yoga", "riscaldamento", "defaticamento", "preparation",
      ],
      &["dynamic effort"],
    ),
    ClassificationRow::new(Neck, &["neck", "cervical", "collo"], &[]),
    ClassificationRow::new(
      BoxingBag,
      &["heavy bag", "speed bag", "double end", "bag work", "bag", "pad work", "pad", "mitts", "sacco"],
      &[],
    ),
    ClassificationRow::new(
      BoxingTechnique,
      &["shadow", "shadowboxing", "sparring", "jab", "combo", "combination", "hook", "uppercut"],
      &["hook grip"],
    ),
    ClassificationRow::new(BoxingConditioning, &["jump rope", "skipping", "skip rope", "boxing circuit", "corda"], &[]),
    ClassificationRow::new(
      BoxingDefense,
      &["slip", "slipping", "bob and weave", "parry", "defense", "defence", "roll under"],
      &[],
    ),
    ClassificationRow::new(BoxingFootwork, &["footwork", "pivot", "angles", "in out"], &[]),
    ClassificationRow::new(
      Conditioning,
      &["metcon", "circuit", "amrap", "emom", "hiit", "tabata", "finisher", "battle rope", "intervals", "interval"],
      &[],
    ),
    ClassificationRow::new(CoreAntiLateral, &["side plank", "suitcase", "copenhagen plank"], &[]),
    ClassificationRow::new(CoreAntiRotation, &["pallof", "bird dog", "anti rotation", "renegade row", "dead bug"], &[]),
    ClassificationRow::new(
      CoreRotation,
      &["russian twist", "woodchop", "wood chop", "rotational", "landmine rotation", "cable rotation"],
      &[],
    ),
    ClassificationRow::new(CoreAntiExtension, &["plank", "ab wheel", "rollout", "hollow", "body saw"], &[]),
    ClassificationRow::new(
      Plyometric,
      &[
        "box jump", "depth jump", "drop jump", "broad jump", "jump squat", "squat jump", "tuck jump", "bound",
        "hop", "hopping", "plyo", "plyometric", "pogo", "jump",
      ],
      &["jump rope"],
    ),
    ClassificationRow::new(
      Power,
      &["clean", "snatch", "jerk", "med ball", "medicine ball", "slam", "throw", "explosive", "push press"],
      &[],
    ),
    ClassificationRow::new(
      Hinge,
      &[
        "deadlift", "rdl", "romanian", "hip thrust", "glute bridge", "good morning", "kettlebell swing",
        "kb swing", "swing", "pull through", "back extension", "hyperextension", "reverse hyper", "stacco",
      ],
      &[],
    ),
    ClassificationRow::new(KneeFlexion, &["leg curl", "hamstring curl", "nordic", "glute ham", "ghr"], &[]),
    ClassificationRow::new(
      Squat,
      &["squat", "goblet", "lunge", "leg press", "step up", "pistol", "split squat", "accosciata"],
      &["jump squat", "squat jump", "sissy squat", "spanish squat"],
    ),
    ClassificationRow::new(
      VerticalPush,
      &["overhead press", "military press", "shoulder press", "ohp", "landmine press", "handstand push", "arnold press"],
      &[],
    ),
    ClassificationRow::new(
      HorizontalPush,
      &["bench", "push up", "pushup", "chest press", "floor press", "dumbbell press", "dip", "panca"],
      &[],
    ),
    ClassificationRow::new(VerticalPull, &["pull up", "pullup", "chin up", "chinup", "pulldown", "lat pull", "trazioni"], &[]),
    ClassificationRow::new(HorizontalPull, &["row", "t bar", "inverted row", "rematore"], &["rowing", "erg", "upright row"]),
    ClassificationRow::new(KneeExtension, &["leg extension", "sissy squat", "spanish squat"], &[]),
    ClassificationRow::new(
      IsolationUpper,
      &[
        "curl", "tricep", "triceps", "lateral raise", "front raise", "rear delt", "face pull", "shrug", "fly",
        "flye", "flies", "upright row", "external rotation", "pushdown",
      ],
      &[],
    ),
    ClassificationRow::new(
      IsolationLower,
      &["calf raise", "calf", "calves", "hip flexor", "adductor", "abductor", "clamshell", "band walk", "monster walk"],
      &[],
    ),
    ClassificationRow::new(Carry, &["farmer", "carry", "carries", "yoke"], &[]),
    ClassificationRow::new(
      Conditioning,
      &[
        "sprint", "run", "running", "bike", "biking", "cycling", "rowing", "erg", "burpee", "cardio", "sled", "zone 2",
        "assault", "shuttle", "conditioning", "mountain climber",
      ],
      &[],
    ),
    ClassificationRow::new(
      SportSkill,
      &["drill", "technique", "skill", "agility", "ladder", "cone", "practice", "rondo", "shooting", "passing"],
      &[],
    ),
  ]
}

pub fn default_profiles() -> BTreeMap<MovementPattern, PatternProfile> {
  use MovementPattern::*;
  let profile = |muscles: &[&str], sfr: u8, compound: bool, region: Region, balance: Option<Balance>, chain: Option<Chain>| {
    PatternProfile {
      muscles: muscles.iter().map(|m| m.to_string()).collect(),
      sfr,
      compound,
      region,
      balance,
      chain,
    }
  };

  BTreeMap::from([
    (Hinge, profile(&["hamstrings", "glutes", "erectors"], 8, true, Region::Lower, None, Some(Chain::Posterior))),
    (Squat, profile(&["quads", "glutes", "adductors"], 7, true, Region::Lower, None, Some(Chain::Anterior))),
    (HorizontalPush, profile(&["chest", "front delts", "triceps"], 7, true, Region::Upper, Some(Balance::Push), Some(Chain::Anterior))),
    (HorizontalPull, profile(&["lats", "rhomboids", "rear delts"], 8, true, Region::Upper, Some(Balance::Pull), Some(Chain::Posterior))),
    (VerticalPush, profile(&["delts", "triceps"], 7, true, Region::Upper, Some(Balance::Push), Some(Chain::Anterior))),
    (VerticalPull, profile(&["lats", "biceps"], 9, true, Region::Upper, Some(Balance::Pull), Some(Chain::Posterior))),
    (KneeFlexion, profile(&["hamstrings"], 6, false, Region::Lower, None, Some(Chain::Posterior))),
    (KneeExtension, profile(&["quads"], 4, false, Region::Lower, None, Some(Chain::Anterior))),
    (CoreAntiExtension, profile(&["rectus abdominis", "transverse abdominis"], 8, false, Region::Core, None, None)),
    (CoreAntiRotation, profile(&["obliques", "transverse abdominis"], 8, false, Region::Core, None, None)),
    (CoreAntiLateral, profile(&["obliques", "quadratus lumborum"], 7, false, Region::Core, None, None)),
    (CoreRotation, profile(&["obliques"], 7, false, Region::Core, None, None)),
    (Plyometric, profile(&["quads", "glutes", "calves"], 6, true, Region::Lower, None, None)),
    (Power, profile(&["posterior chain", "traps", "quads"], 5, true, Region::Full, None, None)),
    (Carry, profile(&["grip", "traps", "core"], 7, true, Region::Full, None, None)),
    (IsolationUpper, profile(&["arms", "delts"], 5, false, Region::Upper, None, None)),
    (IsolationLower, profile(&["calves", "adductors"], 4, false, Region::Lower, None, None)),
    (Conditioning, profile(&["cardiovascular"], 5, false, Region::Full, None, None)),
    (Mobility, profile(&["joints"], 10, false, Region::Full, None, None)),
    (Neck, profile(&["neck flexors", "neck extensors"], 8, false, Region::Upper, None, None)),
    (BoxingTechnique, profile(&["shoulders", "core"], 9, false, Region::Full, None, None)),
    (BoxingBag, profile(&["shoulders", "core", "legs"], 7, false, Region::Full, None, None)),
    (BoxingFootwork, profile(&["calves", "legs"], 8, false, Region::Lower, None, None)),
    (BoxingDefense, profile(&["core", "legs"], 9, false, Region::Full, None, None)),
    (BoxingConditioning, profile(&["cardiovascular", "calves"], 7, false, Region::Full, None, None)),
    (SportSkill, profile(&["sport specific"], 9, false, Region::Full, None, None)),
  ])
}

/// ---------------------------------------------------------------------------
/// Compiled Classifier
/// ---------------------------------------------------------------------------

/// Lowercase, hyphens and underscores to spaces, single spaces
pub fn normalize_name(name: &str) -> String {
  name
    .to_lowercase()
    .replace(['-', '_'], " ")
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Alternation of whole-word keywords, allowing a plural or "-ing" ending:
/// `\b(?:a|b|c)(?:s|es|ing)?\b`
fn keyword_regex(keywords: &[String]) -> Result<Option<Regex>, ConfigError> {
  let alternatives: Vec<String> = keywords
    .iter()
    .map(|k| normalize_name(k))
    .filter(|k| !k.is_empty())
    .map(|k| regex::escape(&k))
    .collect();
  if alternatives.is_empty() {
    return Ok(None);
  }
  let pattern = format!(r"\b(?:{})(?:s|es|ing)?\b", alternatives.join("|"));
  Regex::new(&pattern)
    .map(Some)
    .map_err(|source| ConfigError::InvalidPattern { pattern, source })
}

#[derive(Debug, Clone)]
struct CompiledRow {
  pattern: MovementPattern,
  keywords: Regex,
  excludes: Option<Regex>,
}

#[derive(Debug, Clone)]
pub struct PatternClassifier {
  rows: Vec<CompiledRow>,
  warmup: Option<Regex>,
  warmup_excludes: Option<Regex>,
  cooldown: Option<Regex>,
  explicit_cooldown: Option<Regex>,
  unilateral: Option<Regex>,
  low_intensity: Option<Regex>,
}

impl PatternClassifier {
  pub fn new(rows: &[ClassificationRow], markers: &SessionMarkers) -> Result<Self, ConfigError> {
    let mut compiled = Vec::with_capacity(rows.len());
    for row in rows {
      let Some(keywords) = keyword_regex(&row.keywords)? else { continue };
      compiled.push(CompiledRow {
        pattern: row.pattern,
        keywords,
        excludes: keyword_regex(&row.excludes)?,
      });
    }
    Ok(Self {
      rows: compiled,
      warmup: keyword_regex(&markers.warmup)?,
      warmup_excludes: keyword_regex(&markers.warmup_excludes)?,
      cooldown: keyword_regex(&markers.cooldown)?,
      explicit_cooldown: keyword_regex(&markers.explicit_cooldown)?,
      unilateral: keyword_regex(&markers.unilateral)?,
      low_intensity: keyword_regex(&markers.low_intensity)?,
    })
  }

  pub fn from_rules(rules: &RuleSet) -> Result<Self, ConfigError> {
    Self::new(&rules.classification, &rules.markers)
  }

  /// First matching row wins; `Unknown` when nothing matches
  pub fn classify(&self, name: &str) -> MovementPattern {
    let normalized = normalize_name(name);
    if normalized.is_empty() {
      return MovementPattern::Unknown;
    }
    self
      .rows
      .iter()
      .find(|row| {
        row.keywords.is_match(&normalized) && !row.excludes.as_ref().is_some_and(|ex| ex.is_match(&normalized))
      })
      .map(|row| row.pattern)
      .unwrap_or(MovementPattern::Unknown)
  }

  /// A genuine mobility/dynamic-prep item, not a sport drill dressed up as one
  pub fn is_warmup(&self, name: &str) -> bool {
    let normalized = normalize_name(name);
    matches(&self.warmup, &normalized)
      && !matches(&self.warmup_excludes, &normalized)
      && !matches(&self.explicit_cooldown, &normalized)
  }

  /// Explicit cool-down words first, so "Cool-down: mobility & stretching"
  /// is not read as a warm-up
  pub fn is_cooldown(&self, name: &str) -> bool {
    let normalized = normalize_name(name);
    matches(&self.explicit_cooldown, &normalized)
      || (matches(&self.cooldown, &normalized) && !matches(&self.warmup, &normalized))
  }

  pub fn is_unilateral(&self, name: &str) -> bool {
    matches(&self.unilateral, &normalize_name(name))
  }

  pub fn mentions_low_intensity(&self, text: &str) -> bool {
    matches(&self.low_intensity, &normalize_name(text))
  }
}

fn matches(re: &Option<Regex>, text: &str) -> bool {
  re.as_ref().is_some_and(|r| r.is_match(text))
}

/// ---------------------------------------------------------------------------
/// Session View
/// ---------------------------------------------------------------------------

/// An entry together with everything the rules need to know about it
#[derive(Debug, Clone)]
pub struct ClassifiedEntry<'a> {
  pub index: usize,
  pub entry: &'a ExerciseEntry,
  pub pattern: MovementPattern,
  pub reps: RepsSpec,
  pub rest_seconds: Option<u32>,
  pub is_warmup: bool,
  pub is_cooldown: bool,
  pub is_unilateral: bool,
  pub fixed: Option<&'a FixedParams>,
  pub profile: Option<&'a PatternProfile>,
}

impl ClassifiedEntry<'_> {
  pub fn name(&self) -> &str {
    &self.entry.name
  }

  pub fn lower_name(&self) -> String {
    normalize_name(&self.entry.name)
  }

  pub fn has_name(&self) -> bool {
    self.entry.has_name()
  }

  pub fn sets(&self) -> u32 {
    self.entry.sets.unwrap_or(3)
  }

  pub fn kind(&self) -> ExerciseType {
    self.entry.exercise_type
  }

  /// Neither warm-up nor cool-down
  pub fn is_main(&self) -> bool {
    !self.is_warmup && !self.is_cooldown
  }

  pub fn is_round_based(&self) -> bool {
    self.fixed.is_some_and(|f| f.round_based())
  }

  pub fn is_compound(&self) -> bool {
    self.profile.is_some_and(|p| p.compound)
  }

  pub fn balance(&self) -> Option<Balance> {
    self.profile.and_then(|p| p.balance)
  }

  pub fn chain(&self) -> Option<Chain> {
    self.profile.and_then(|p| p.chain)
  }

  /// Strength work at five reps or fewer
  pub fn is_heavy(&self) -> bool {
    self.kind() == ExerciseType::Strength && self.reps.max_count().is_some_and(|r| r <= 5)
  }

  /// Conditioning that should not precede strength work
  pub fn is_heavy_conditioning(&self) -> bool {
    self.is_main()
      && (self.kind() == ExerciseType::Conditioning
        || matches!(
          self.pattern,
          MovementPattern::Conditioning
            | MovementPattern::BoxingBag
            | MovementPattern::BoxingConditioning
            | MovementPattern::BoxingTechnique
        ))
  }

  pub fn mentions(&self, keywords: &[&str]) -> bool {
    let name = self.lower_name();
    keywords.iter().any(|k| name.contains(k))
  }
}

/// Read-only classification of one session for one call
#[derive(Debug, Clone)]
pub struct SessionView<'a> {
  pub session: &'a Session,
  pub sport: Sport,
  pub entries: Vec<ClassifiedEntry<'a>>,
  pub low_intensity: bool,
}

impl<'a> SessionView<'a> {
  pub fn new(session: &'a Session, context: &AthleteContext, rules: &'a RuleSet, classifier: &PatternClassifier) -> Self {
    let entries = session
      .exercises
      .iter()
      .enumerate()
      .map(|(index, entry)| {
        let pattern = classifier.classify(&entry.name);
        ClassifiedEntry {
          index,
          entry,
          pattern,
          reps: entry.reps_spec(),
          rest_seconds: entry.rest_seconds(),
          is_warmup: entry.has_name() && classifier.is_warmup(&entry.name),
          is_cooldown: entry.has_name() && classifier.is_cooldown(&entry.name),
          is_unilateral: classifier.is_unilateral(&entry.name),
          fixed: rules.fixed(pattern),
          profile: rules.profile(pattern),
        }
      })
      .collect();

    Self {
      session,
      sport: Sport::resolve(context.sport.as_ref(), session.sport.as_deref()),
      entries,
      low_intensity: is_low_intensity(session, context, classifier),
    }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Named entries that are neither warm-up nor cool-down
  pub fn working(&self) -> impl Iterator<Item = &ClassifiedEntry<'a>> {
    self.entries.iter().filter(|e| e.has_name() && e.is_main())
  }

  pub fn working_sets(&self) -> u32 {
    self.working().map(|e| e.sets()).fold(0u32, u32::saturating_add)
  }

  pub fn sets_where(&self, predicate: impl Fn(&ClassifiedEntry<'a>) -> bool) -> u32 {
    self.working().filter(|e| predicate(e)).map(|e| e.sets()).fold(0u32, u32::saturating_add)
  }

  pub fn any(&self, predicate: impl Fn(&ClassifiedEntry<'a>) -> bool) -> bool {
    self.working().any(predicate)
  }

  pub fn has_pattern(&self, pattern: MovementPattern) -> bool {
    self.any(|e| e.pattern == pattern)
  }

  pub fn mentions(&self, keywords: &[&str]) -> bool {
    self.any(|e| e.mentions(keywords))
  }

  /// Total rounds of round-based work
  pub fn boxing_rounds(&self) -> u32 {
    self.sets_where(|e| e.is_round_based())
  }

  pub fn sport_skill_entries(&self) -> usize {
    self.working().filter(|e| e.pattern.is_sport_skill()).count()
  }

  pub fn sport_skill_sets(&self) -> u32 {
    self.sets_where(|e| e.pattern.is_sport_skill())
  }
}

/// Deload phase, recovery periodization, or a title that says so
pub fn is_low_intensity(session: &Session, context: &AthleteContext, classifier: &PatternClassifier) -> bool {
  context.phase == Some(crate::models::Phase::Deload)
    || context.periodization.as_ref().is_some_and(|p| p.is_recovery())
    || classifier.mentions_low_intensity(&session.title)
}
