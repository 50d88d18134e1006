use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Movement Pattern Taxonomy
/// ---------------------------------------------------------------------------

/// Canonical movement categories every exercise name is classified into.
///
/// The set is closed: rule tables key on these variants, and anything the
/// classifier cannot place lands in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
  Squat,
  Hinge,
  HorizontalPush,
  HorizontalPull,
  VerticalPush,
  VerticalPull,
  KneeFlexion,
  KneeExtension,
  CoreAntiExtension,
  CoreAntiRotation,
  CoreAntiLateral,
  CoreRotation,
  Plyometric,
  Power,
  Carry,
  IsolationUpper,
  IsolationLower,
  Conditioning,
  Mobility,
  Neck,
  BoxingTechnique,
  BoxingBag,
  BoxingFootwork,
  BoxingDefense,
  BoxingConditioning,
  SportSkill,
  Unknown,
}

impl MovementPattern {
  pub const ALL: [MovementPattern; 27] = [
    Self::Squat,
    Self::Hinge,
    Self::HorizontalPush,
    Self::HorizontalPull,
    Self::VerticalPush,
    Self::VerticalPull,
    Self::KneeFlexion,
    Self::KneeExtension,
    Self::CoreAntiExtension,
    Self::CoreAntiRotation,
    Self::CoreAntiLateral,
    Self::CoreRotation,
    Self::Plyometric,
    Self::Power,
    Self::Carry,
    Self::IsolationUpper,
    Self::IsolationLower,
    Self::Conditioning,
    Self::Mobility,
    Self::Neck,
    Self::BoxingTechnique,
    Self::BoxingBag,
    Self::BoxingFootwork,
    Self::BoxingDefense,
    Self::BoxingConditioning,
    Self::SportSkill,
    Self::Unknown,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Squat => "squat",
      Self::Hinge => "hinge",
      Self::HorizontalPush => "horizontal_push",
      Self::HorizontalPull => "horizontal_pull",
      Self::VerticalPush => "vertical_push",
      Self::VerticalPull => "vertical_pull",
      Self::KneeFlexion => "knee_flexion",
      Self::KneeExtension => "knee_extension",
      Self::CoreAntiExtension => "core_anti_extension",
      Self::CoreAntiRotation => "core_anti_rotation",
      Self::CoreAntiLateral => "core_anti_lateral",
      Self::CoreRotation => "core_rotation",
      Self::Plyometric => "plyometric",
      Self::Power => "power",
      Self::Carry => "carry",
      Self::IsolationUpper => "isolation_upper",
      Self::IsolationLower => "isolation_lower",
      Self::Conditioning => "conditioning",
      Self::Mobility => "mobility",
      Self::Neck => "neck",
      Self::BoxingTechnique => "boxing_technique",
      Self::BoxingBag => "boxing_bag",
      Self::BoxingFootwork => "boxing_footwork",
      Self::BoxingDefense => "boxing_defense",
      Self::BoxingConditioning => "boxing_conditioning",
      Self::SportSkill => "sport_skill",
      Self::Unknown => "unknown",
    }
  }

  pub fn is_core(&self) -> bool {
    matches!(
      self,
      Self::CoreAntiExtension | Self::CoreAntiRotation | Self::CoreAntiLateral | Self::CoreRotation
    )
  }

  pub fn is_boxing(&self) -> bool {
    matches!(
      self,
      Self::BoxingTechnique
        | Self::BoxingBag
        | Self::BoxingFootwork
        | Self::BoxingDefense
        | Self::BoxingConditioning
    )
  }

  /// Skill work that sequencing and biomechanics treat as "sport-specific"
  pub fn is_sport_skill(&self) -> bool {
    self.is_boxing() || matches!(self, Self::SportSkill)
  }

  pub fn is_isolation(&self) -> bool {
    matches!(
      self,
      Self::IsolationUpper | Self::IsolationLower | Self::KneeExtension | Self::KneeFlexion
    )
  }

  pub fn is_explosive(&self) -> bool {
    matches!(self, Self::Plyometric | Self::Power)
  }

  /// Generic work blocks whose bare names say nothing about the prescription
  pub fn is_unspecific(&self) -> bool {
    self.is_sport_skill() || matches!(self, Self::Conditioning | Self::Unknown)
  }
}

impl std::fmt::Display for MovementPattern {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for MovementPattern {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .copied()
      .find(|p| p.as_str() == s)
      .ok_or_else(|| format!("Unknown movement pattern: {}", s))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pattern_string_roundtrip_covers_every_variant() {
    for pattern in MovementPattern::ALL {
      let parsed: MovementPattern = pattern.to_string().parse().unwrap();
      assert_eq!(parsed, pattern);
    }
  }

  #[test]
  fn test_pattern_serializes_snake_case() {
    let json = serde_json::to_string(&MovementPattern::CoreAntiRotation).unwrap();
    assert_eq!(json, "\"core_anti_rotation\"");
  }

  #[test]
  fn test_pattern_groups() {
    assert!(MovementPattern::BoxingBag.is_sport_skill());
    assert!(MovementPattern::SportSkill.is_unspecific());
    assert!(!MovementPattern::Squat.is_unspecific());
    assert!(MovementPattern::CoreAntiLateral.is_core());
    assert!("sideways".parse::<MovementPattern>().is_err());
  }
}
