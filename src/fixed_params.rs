//! Fixed-parameter table
//!
//! Canonical prescription constraints keyed by movement pattern. The
//! validator reports entries that break them and the corrector rewrites
//! entries to satisfy them, so both read the same table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::MovementPattern;
use crate::prescription::{minutes_label, RepsSpec};

/// ---------------------------------------------------------------------------
/// Rule Types
/// ---------------------------------------------------------------------------

/// How a pattern's reps must be expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepUnit {
  /// Never duration-based: discrete repetitions only
  Count,
  /// Round-based: time per round
  Duration,
  #[default]
  Any,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedParams {
  pub unit: RepUnit,
  /// Written into `reps` when the entry's value breaks the rule
  pub canonical_reps: Option<String>,
  pub rep_range: Option<(u32, u32)>,
  pub max_duration_seconds: Option<u32>,
  pub min_rest_seconds: Option<u32>,
  /// Rest written when a round-based entry has none
  pub default_rest: Option<String>,
}

impl FixedParams {
  pub fn never_duration(&self) -> bool {
    self.unit == RepUnit::Count
  }

  pub fn round_based(&self) -> bool {
    self.unit == RepUnit::Duration
  }

  /// Reps violate the unit rule in the "never duration-based" direction
  pub fn duration_on_count_pattern(&self, reps: &RepsSpec) -> bool {
    self.never_duration() && reps.is_duration()
  }

  pub fn exceeds_max_duration(&self, reps: &RepsSpec) -> bool {
    match (self.max_duration_seconds, reps.seconds()) {
      (Some(max), Some(seconds)) => seconds > max,
      _ => false,
    }
  }

  pub fn rest_below_minimum(&self, rest_seconds: Option<u32>) -> bool {
    match (self.min_rest_seconds, rest_seconds) {
      (Some(min), Some(rest)) => rest > 0 && rest < min,
      _ => false,
    }
  }

  /// Canonical count reps for a pattern that must not be timed
  pub fn count_reps(&self) -> String {
    self.canonical_reps.clone().unwrap_or_else(|| "8-10".to_string())
  }

  /// Round-based reps from a bare number: 1-5 reads as minutes, anything else
  /// falls back to the canonical round length
  pub fn round_reps(&self, reps: &RepsSpec, raw: &str) -> String {
    let canonical = || self.canonical_reps.clone().unwrap_or_else(|| minutes_label(3));
    match reps {
      RepsSpec::Count { low, high } if low == high && raw.trim().chars().all(|c| c.is_ascii_digit()) => {
        if (1..=5).contains(low) {
          minutes_label(*low)
        } else {
          canonical()
        }
      }
      RepsSpec::Duration { seconds } if seconds % 60 == 0 && *seconds > 0 => minutes_label(seconds / 60),
      RepsSpec::Duration { .. } => raw.to_string(),
      _ => canonical(),
    }
  }
}

/// Minimum rest for low-rep compound strength work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthRestGuide {
  /// Reps at or under which the rule applies at all
  pub low_rep_ceiling: u32,
  pub max_strength_reps: u32,
  pub max_strength_rest_seconds: u32,
  pub strength_rest_seconds: u32,
  /// Rest under this is a blocking violation
  pub blocking_below_seconds: u32,
}

impl Default for StrengthRestGuide {
  fn default() -> Self {
    Self {
      low_rep_ceiling: 5,
      max_strength_reps: 3,
      max_strength_rest_seconds: 180,
      strength_rest_seconds: 150,
      blocking_below_seconds: 120,
    }
  }
}

impl StrengthRestGuide {
  /// Recommended minimum rest for the given top-end rep count, if low-rep
  pub fn minimum_for(&self, reps_high: u32) -> Option<u32> {
    if reps_high == 0 || reps_high > self.low_rep_ceiling {
      None
    } else if reps_high <= self.max_strength_reps {
      Some(self.max_strength_rest_seconds)
    } else {
      Some(self.strength_rest_seconds)
    }
  }
}

/// Rest inside an A1/A2 superset: the lead exercise goes straight into the
/// follower, the follower carries the pair's recovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupersetRest {
  /// Lead rest above this is replaced with `lead_rest_seconds`
  pub lead_max_rest_seconds: u32,
  pub lead_rest_seconds: u32,
  /// Follower rest below this is replaced with `follow_rest_seconds`
  pub follow_min_rest_seconds: u32,
  pub follow_rest_seconds: u32,
}

impl Default for SupersetRest {
  fn default() -> Self {
    Self {
      lead_max_rest_seconds: 30,
      lead_rest_seconds: 0,
      follow_min_rest_seconds: 90,
      follow_rest_seconds: 120,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Default Table
/// ---------------------------------------------------------------------------

pub fn default_table() -> BTreeMap<MovementPattern, FixedParams> {
  let round_based = FixedParams {
    unit: RepUnit::Duration,
    canonical_reps: Some(minutes_label(3)),
    default_rest: Some("60s".into()),
    ..Default::default()
  };

  BTreeMap::from([
    (
      MovementPattern::Plyometric,
      FixedParams {
        unit: RepUnit::Count,
        canonical_reps: Some("5".into()),
        rep_range: Some((3, 8)),
        min_rest_seconds: Some(90),
        ..Default::default()
      },
    ),
    (
      MovementPattern::Power,
      FixedParams {
        unit: RepUnit::Count,
        canonical_reps: Some("3-5".into()),
        rep_range: Some((1, 6)),
        min_rest_seconds: Some(90),
        ..Default::default()
      },
    ),
    (
      MovementPattern::Neck,
      FixedParams {
        unit: RepUnit::Count,
        canonical_reps: Some("15-20".into()),
        rep_range: Some((12, 20)),
        min_rest_seconds: Some(30),
        ..Default::default()
      },
    ),
    (
      MovementPattern::CoreAntiExtension,
      FixedParams {
        canonical_reps: Some("45 sec".into()),
        max_duration_seconds: Some(60),
        ..Default::default()
      },
    ),
    (
      MovementPattern::CoreAntiLateral,
      FixedParams {
        canonical_reps: Some("30 sec".into()),
        max_duration_seconds: Some(60),
        ..Default::default()
      },
    ),
    (MovementPattern::BoxingBag, round_based.clone()),
    (MovementPattern::BoxingTechnique, round_based.clone()),
    (MovementPattern::BoxingConditioning, round_based),
  ])
}
