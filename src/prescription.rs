//! Free-text prescription parsing
//!
//! Reps, rest and exercise names arrive as free text from the upstream
//! generator ("8-10", "3 min", "45 sec", "90s", "Heavy Bag: 6x3min").
//! The validator, scorer and corrector all read them through this module so
//! they agree on what a prescription means.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

/// ---------------------------------------------------------------------------
/// Compiled Patterns
/// ---------------------------------------------------------------------------

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^(?:\d+\s*)?(?:rounds?|sets?)$|^n/?a$|^as prescribed$|^circuit$|^varies$|^tbd$|^-+$|^\?+$")
    .expect("valid placeholder regex")
});

static AMRAP_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\b(?:amrap|max(?:imum)?|to failure|failure)\b").expect("valid amrap regex"));

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:[-–]\s*\d+(?:[.,]\d+)?\s*)?(minutes|minute|mins|min|'|seconds|second|secs|sec|s)(?:$|[^a-z])")
    .expect("valid duration regex")
});

static COUNT_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(\d+)\s*(?:[-–]\s*(\d+))?").expect("valid count regex"));

static SUPERSET_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^\s*([a-f])([12])[:.)\s]|\(\s*superset\s*([a-f])([12])\s*\)|\b([a-f])([12])\)")
    .expect("valid superset regex")
});

static REST_CLOCK_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(\d+):(\d{2})").expect("valid rest clock regex"));

static TIMED_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)(?P<tok>(?P<sets>\d+)\s*[x×]\s*(?P<val>\d+)\s*(?:minutes|minute|mins|min|'))(?:$|[^a-z])")
    .expect("valid timed token regex")
});

static SECONDS_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)(?P<tok>(?P<sets>\d+)\s*[x×]\s*(?P<val>\d+)\s*(?:seconds|second|secs|sec|s))(?:$|[^a-z])")
    .expect("valid seconds token regex")
});

static CIRCUIT_TOKEN_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)(?P<tok>(?P<sets>\d+)\s*[x×])\s*\(").expect("valid circuit token regex"));

static REPS_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)(?P<tok>(?P<sets>\d+)\s*[x×]\s*(?P<val>\d+(?:\s*[-–]\s*\d+)?))(?:$|[^a-z0-9])")
    .expect("valid reps token regex")
});

static NAME_MINUTES_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:minutes|minute|mins|min)\b").expect("valid name minutes regex"));

static NAME_DISTANCE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*m\b").expect("valid name distance regex"));

/// ---------------------------------------------------------------------------
/// Reps
/// ---------------------------------------------------------------------------

/// What a `reps` string prescribes once parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepsSpec {
  Empty,
  /// "rounds", "n/a", "as prescribed" and other stand-ins for a real value
  Placeholder,
  Count { low: u32, high: u32 },
  /// Lower bound of the prescribed duration
  Duration { seconds: u32 },
  Amrap,
  Other,
}

impl RepsSpec {
  pub fn parse(text: &str) -> Self {
    let trimmed = text.trim();
    if trimmed.is_empty() {
      return Self::Empty;
    }
    if PLACEHOLDER_RE.is_match(trimmed) {
      return Self::Placeholder;
    }
    if let Some(caps) = DURATION_RE.captures(trimmed) {
      let value: f64 = caps[1].replace(',', ".").parse().unwrap_or(0.0);
      let unit = caps[2].to_lowercase();
      let seconds = if unit.starts_with('m') || unit == "'" { value * 60.0 } else { value };
      return Self::Duration { seconds: seconds.round() as u32 };
    }
    if let Some(caps) = COUNT_RE.captures(trimmed) {
      let low: u32 = caps[1].parse().unwrap_or(0);
      let high = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(low);
      return Self::Count { low: low.min(high), high: low.max(high) };
    }
    if AMRAP_RE.is_match(trimmed) {
      return Self::Amrap;
    }
    Self::Other
  }

  pub fn is_duration(&self) -> bool {
    matches!(self, Self::Duration { .. })
  }

  pub fn is_count(&self) -> bool {
    matches!(self, Self::Count { .. })
  }

  /// Reps are missing or a stand-in and should be inferred
  pub fn needs_inference(&self) -> bool {
    matches!(self, Self::Empty | Self::Placeholder)
  }

  pub fn seconds(&self) -> Option<u32> {
    match self {
      Self::Duration { seconds } => Some(*seconds),
      _ => None,
    }
  }

  pub fn minutes(&self) -> Option<f64> {
    self.seconds().map(|s| s as f64 / 60.0)
  }

  /// Upper bound of a rep count, used for "low-rep" checks
  pub fn max_count(&self) -> Option<u32> {
    match self {
      Self::Count { high, .. } => Some(*high),
      _ => None,
    }
  }

  /// Rep-equivalent used for volume-load estimates.
  /// Ranges average, minutes count 15 reps each, seconds a third of a rep.
  pub fn equivalent_reps(&self) -> f64 {
    match self {
      Self::Count { low, high } => (*low as f64 + *high as f64) / 2.0,
      Self::Duration { seconds } if seconds % 60 == 0 => (*seconds / 60) as f64 * 15.0,
      Self::Duration { seconds } => *seconds as f64 / 3.0,
      Self::Placeholder => 30.0,
      Self::Amrap => 12.0,
      Self::Empty | Self::Other => 10.0,
    }
  }

  /// Seconds of work in one set, used for duration estimates
  pub fn work_seconds(&self) -> u32 {
    match self {
      Self::Duration { seconds } => *seconds,
      Self::Count { low, high } => (low.saturating_add(*high) / 2).saturating_mul(4),
      _ => 60,
    }
  }
}

/// "3 minutes", "1 minute"
pub fn minutes_label(minutes: u32) -> String {
  if minutes == 1 {
    "1 minute".to_string()
  } else {
    format!("{} minutes", minutes)
  }
}

/// Normalize a count token ("6 – 8" -> "6-8")
pub fn count_label(raw: &str) -> String {
  raw.chars().filter(|c| !c.is_whitespace()).collect::<String>().replace('–', "-")
}

/// ---------------------------------------------------------------------------
/// Rest
/// ---------------------------------------------------------------------------

/// Rest in seconds: "90s", "2 min", "1:30", "60-90s" (lower bound), "120".
/// Returns None for empty or unparsable text.
pub fn parse_rest_seconds(text: &str) -> Option<u32> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return None;
  }
  if let Some(caps) = REST_CLOCK_RE.captures(trimmed) {
    let minutes: u32 = caps[1].parse().ok()?;
    let seconds: u32 = caps[2].parse().ok()?;
    return minutes.checked_mul(60)?.checked_add(seconds);
  }
  match RepsSpec::parse(trimmed) {
    RepsSpec::Duration { seconds } => Some(seconds),
    RepsSpec::Count { low, .. } => Some(low),
    _ => None,
  }
}

pub fn rest_label(seconds: u32) -> String {
  format!("{}s", seconds)
}

/// Place of an entry inside an "A1"/"A2" superset pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupersetRole {
  /// A1: moves straight on to its partner
  Lead,
  /// A2: rests before the pair repeats
  Follow,
}

/// Superset letter and position, as in "B2"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupersetSlot {
  pub group: char,
  pub role: SupersetRole,
}

/// Reads "A1: Bench Press", "A2) Row" and "Row (superset A2)"
pub fn superset_slot(name: &str) -> Option<SupersetSlot> {
  let caps = SUPERSET_RE.captures(name)?;
  let (group, digit) = [(1, 2), (3, 4), (5, 6)]
    .iter()
    .find_map(|&(g, d)| Some((caps.get(g)?, caps.get(d)?)))?;
  Some(SupersetSlot {
    group: group.as_str().chars().next()?.to_ascii_uppercase(),
    role: if digit.as_str() == "1" {
      SupersetRole::Lead
    } else {
      SupersetRole::Follow
    },
  })
}

pub fn superset_role(name: &str) -> Option<SupersetRole> {
  superset_slot(name).map(|slot| slot.role)
}

/// ---------------------------------------------------------------------------
/// Embedded Name Tokens
/// ---------------------------------------------------------------------------

/// A "sets x value" token embedded in an exercise name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameToken {
  /// "6x3min"
  TimedSets { sets: u32, minutes: u32 },
  /// "3x45s"
  SecondSets { sets: u32, seconds: u32 },
  /// "4x (10 Burpees + ...)"
  CircuitRounds { sets: u32 },
  /// "4x6-8"
  RepSets { sets: u32, reps: String },
}

impl NameToken {
  pub fn sets(&self) -> u32 {
    match self {
      Self::TimedSets { sets, .. }
      | Self::SecondSets { sets, .. }
      | Self::CircuitRounds { sets }
      | Self::RepSets { sets, .. } => *sets,
    }
  }

  pub fn is_duration(&self) -> bool {
    matches!(self, Self::TimedSets { .. } | Self::SecondSets { .. })
  }

  pub fn with_sets(&self, sets: u32) -> Self {
    match self {
      Self::TimedSets { minutes, .. } => Self::TimedSets { sets, minutes: *minutes },
      Self::SecondSets { seconds, .. } => Self::SecondSets { sets, seconds: *seconds },
      Self::CircuitRounds { .. } => Self::CircuitRounds { sets },
      Self::RepSets { reps, .. } => Self::RepSets { sets, reps: reps.clone() },
    }
  }

  /// Text form written back into a name
  pub fn render(&self) -> String {
    match self {
      Self::TimedSets { sets, minutes } => format!("{}x{}min", sets, minutes),
      Self::SecondSets { sets, seconds } => format!("{}x{}s", sets, seconds),
      Self::CircuitRounds { sets } => format!("{}x", sets),
      Self::RepSets { sets, reps } => format!("{}x{}", sets, reps),
    }
  }

  /// Token that prescribes `sets` of the given reps text, in whichever form fits it
  pub fn for_reps(sets: u32, reps: &str) -> Self {
    match RepsSpec::parse(reps) {
      RepsSpec::Duration { seconds } if seconds % 60 == 0 && seconds > 0 => {
        Self::TimedSets { sets, minutes: seconds / 60 }
      }
      RepsSpec::Duration { seconds } => Self::SecondSets { sets, seconds },
      _ => Self::RepSets { sets, reps: count_label(reps) },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
  pub token: NameToken,
  pub range: Range<usize>,
}

impl TokenMatch {
  /// Replace the token in `name` with another token
  pub fn replace_in(&self, name: &str, token: &NameToken) -> String {
    format!("{}{}{}", &name[..self.range.start], token.render(), &name[self.range.end..])
  }
}

/// Earliest "sets x value" token in a name. When several forms start at the
/// same offset, timed beats seconds beats circuit beats plain reps.
pub fn find_name_token(name: &str) -> Option<TokenMatch> {
  let candidates: [(&Regex, u8); 4] = [
    (&TIMED_TOKEN_RE, 0),
    (&SECONDS_TOKEN_RE, 1),
    (&CIRCUIT_TOKEN_RE, 2),
    (&REPS_TOKEN_RE, 3),
  ];

  let mut best: Option<(usize, u8, TokenMatch)> = None;
  for (re, priority) in candidates {
    let Some(caps) = re.captures(name) else { continue };
    let Some(tok) = caps.name("tok") else { continue };
    let Some(sets) = caps.name("sets").and_then(|m| m.as_str().parse::<u32>().ok()) else {
      continue;
    };
    let value = caps.name("val").map(|m| m.as_str());
    let token = match priority {
      0 => NameToken::TimedSets { sets, minutes: value.and_then(|v| v.parse().ok()).unwrap_or(0) },
      1 => NameToken::SecondSets { sets, seconds: value.and_then(|v| v.parse().ok()).unwrap_or(0) },
      2 => NameToken::CircuitRounds { sets },
      _ => NameToken::RepSets { sets, reps: count_label(value.unwrap_or_default()) },
    };
    let start = tok.start();
    let better = match &best {
      None => true,
      Some((best_start, best_priority, _)) => (start, priority) < (*best_start, *best_priority),
    };
    if better {
      best = Some((start, priority, TokenMatch { token, range: tok.range() }));
    }
  }
  best.map(|(_, _, m)| m)
}

/// "Cardio: 20min steady" -> 20
pub fn name_minutes(name: &str) -> Option<u32> {
  NAME_MINUTES_RE.captures(name).and_then(|c| c[1].parse().ok())
}

/// "Sprints: 6x (30m ...)" -> 30
pub fn name_distance_meters(name: &str) -> Option<u32> {
  NAME_DISTANCE_RE.captures(name).and_then(|c| c[1].parse().ok())
}

pub fn has_digits(text: &str) -> bool {
  text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_reps_forms() {
    assert_eq!(RepsSpec::parse(""), RepsSpec::Empty);
    assert_eq!(RepsSpec::parse("  "), RepsSpec::Empty);
    assert_eq!(RepsSpec::parse("8-10"), RepsSpec::Count { low: 8, high: 10 });
    assert_eq!(RepsSpec::parse("6"), RepsSpec::Count { low: 6, high: 6 });
    assert_eq!(RepsSpec::parse("10/side"), RepsSpec::Count { low: 10, high: 10 });
    assert_eq!(RepsSpec::parse("3 min"), RepsSpec::Duration { seconds: 180 });
    assert_eq!(RepsSpec::parse("3 minutes"), RepsSpec::Duration { seconds: 180 });
    assert_eq!(RepsSpec::parse("45 sec"), RepsSpec::Duration { seconds: 45 });
    assert_eq!(RepsSpec::parse("30s"), RepsSpec::Duration { seconds: 30 });
    assert_eq!(RepsSpec::parse("5-7 min"), RepsSpec::Duration { seconds: 300 });
    assert_eq!(RepsSpec::parse("rounds"), RepsSpec::Placeholder);
    assert_eq!(RepsSpec::parse("3 rounds"), RepsSpec::Placeholder);
    assert_eq!(RepsSpec::parse("N/A"), RepsSpec::Placeholder);
    assert_eq!(RepsSpec::parse("AMRAP"), RepsSpec::Amrap);
    assert_eq!(RepsSpec::parse("controlled"), RepsSpec::Other);
  }

  #[test]
  fn test_reps_text_is_not_mistaken_for_seconds() {
    // "reps" ends in s but is not a seconds unit
    assert_eq!(RepsSpec::parse("10 reps"), RepsSpec::Count { low: 10, high: 10 });
  }

  #[test]
  fn test_equivalent_reps() {
    assert_eq!(RepsSpec::parse("8-12").equivalent_reps(), 10.0);
    assert_eq!(RepsSpec::parse("2 min").equivalent_reps(), 30.0);
    assert_eq!(RepsSpec::parse("45 sec").equivalent_reps(), 15.0);
    assert_eq!(RepsSpec::parse("amrap").equivalent_reps(), 12.0);
  }

  #[test]
  fn test_parse_rest_seconds() {
    assert_eq!(parse_rest_seconds("90s"), Some(90));
    assert_eq!(parse_rest_seconds("2 min"), Some(120));
    assert_eq!(parse_rest_seconds("1:30"), Some(90));
    assert_eq!(parse_rest_seconds("60-90s"), Some(60));
    assert_eq!(parse_rest_seconds("120"), Some(120));
    assert_eq!(parse_rest_seconds("0"), Some(0));
    assert_eq!(parse_rest_seconds(""), None);
    assert_eq!(parse_rest_seconds("as needed"), None);
  }

  #[test]
  fn test_superset_role() {
    assert_eq!(superset_role("A1: Bench Press"), Some(SupersetRole::Lead));
    assert_eq!(superset_role("a2 Chest Supported Row"), Some(SupersetRole::Follow));
    assert_eq!(superset_role("B1) Split Squat"), Some(SupersetRole::Lead));
    assert_eq!(superset_role("Pull-up (Superset A2)"), Some(SupersetRole::Follow));
    assert_eq!(superset_role("Z2 Bike: 30min"), None);
    assert_eq!(superset_role("Back Squat"), None);
    assert_eq!(superset_role("A10 Sprint"), None);
    assert_eq!(
      superset_slot("c2: Face Pull"),
      Some(SupersetSlot {
        group: 'C',
        role: SupersetRole::Follow
      })
    );
  }

  #[test]
  fn test_oversized_rest_clock_is_unparsable() {
    assert_eq!(parse_rest_seconds("99999999:00"), None);
    assert_eq!(parse_rest_seconds("71582788:16"), None);
    assert_eq!(parse_rest_seconds("71582788:00"), Some(4_294_967_280));
  }

  #[test]
  fn test_find_timed_token() {
    // Act
    let m = find_name_token("Heavy Bag: 6x3min (power combos)").unwrap();

    // Assert
    assert_eq!(m.token, NameToken::TimedSets { sets: 6, minutes: 3 });
    assert_eq!(&"Heavy Bag: 6x3min (power combos)"[m.range.clone()], "6x3min");
  }

  #[test]
  fn test_find_token_variants() {
    assert_eq!(
      find_name_token("Plank 3x45s").map(|m| m.token),
      Some(NameToken::SecondSets { sets: 3, seconds: 45 })
    );
    assert_eq!(
      find_name_token("Back Squat: 4x6-8 @ RPE 8").map(|m| m.token),
      Some(NameToken::RepSets { sets: 4, reps: "6-8".into() })
    );
    assert_eq!(
      find_name_token("MetCon: 4x (10 Burpees + 15 KB Swings)").map(|m| m.token),
      Some(NameToken::CircuitRounds { sets: 4 })
    );
    assert_eq!(
      find_name_token("Neck Strengthening: Flexion 2x15 + Extension 2x15").map(|m| m.token),
      Some(NameToken::RepSets { sets: 2, reps: "15".into() })
    );
  }

  #[test]
  fn test_distances_and_plain_names_have_no_token() {
    assert_eq!(find_name_token("Sprints 6x30m"), None);
    assert_eq!(find_name_token("Back Squat"), None);
    assert_eq!(find_name_token("Dynamic Warm-up: 10min"), None);
  }

  #[test]
  fn test_token_replace_keeps_surrounding_text() {
    // Arrange
    let name = "Neck Extension: 4x3min slow";
    let m = find_name_token(name).unwrap();

    // Act
    let rewritten = m.replace_in(name, &NameToken::for_reps(4, "15-20"));

    // Assert
    assert_eq!(rewritten, "Neck Extension: 4x15-20 slow");
  }

  #[test]
  fn test_token_for_reps_picks_form() {
    assert_eq!(NameToken::for_reps(6, "3 minutes").render(), "6x3min");
    assert_eq!(NameToken::for_reps(3, "45 sec").render(), "3x45s");
    assert_eq!(NameToken::for_reps(4, "6 – 8").render(), "4x6-8");
  }

  #[test]
  fn test_name_minutes_and_distance() {
    assert_eq!(name_minutes("Zone 2 Cardio: 20min steady"), Some(20));
    assert_eq!(name_minutes("Back Squat"), None);
    assert_eq!(name_distance_meters("Sprints: 6x (30m acceleration)"), Some(30));
  }
}
