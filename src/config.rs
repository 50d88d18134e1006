use std::env;
use std::path::{Path, PathBuf};

use crate::models::Category;
use crate::rules::RuleSet;

/// Environment variable naming a JSON rule-set override
pub const RULES_ENV_VAR: &str = "WORKOUT_GUARD_RULES";

/// ---------------------------------------------------------------------------
/// Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read rules file {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Invalid rules JSON: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("Invalid pattern {pattern:?}: {source}")]
  InvalidPattern {
    pattern: String,
    #[source]
    source: regex::Error,
  },

  #[error("Invalid rules: {0}")]
  InvalidRules(String),
}

/// ---------------------------------------------------------------------------
/// Loading
/// ---------------------------------------------------------------------------

impl RuleSet {
  /// Parse an override. Tables the JSON omits keep their built-in values.
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    let rules: RuleSet = serde_json::from_str(json)?;
    rules.check()?;
    Ok(rules)
  }

  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&json)
  }

  /// Rules from the file named by `WORKOUT_GUARD_RULES` (a `.env` file is
  /// honoured); built-in defaults when the variable is unset or empty.
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();

    match env::var(RULES_ENV_VAR) {
      Ok(path) if !path.trim().is_empty() => {
        tracing::info!(path = %path, "Loading rule set override");
        Self::from_path(Path::new(path.trim()))
      }
      _ => Ok(Self::default()),
    }
  }

  /// Reject tables the scorer cannot work with
  pub fn check(&self) -> Result<(), ConfigError> {
    for category in Category::ALL {
      let weight = self.weights.weight(category);
      if !weight.is_finite() || weight < 0.0 {
        return Err(ConfigError::InvalidRules(format!(
          "weight for {} must be a non-negative number, got {}",
          category, weight
        )));
      }
    }
    if self.weights.total() <= 0.0 {
      return Err(ConfigError::InvalidRules("category weights sum to zero".into()));
    }
    if self.grade_bands.windows(2).any(|w| w[0] < w[1]) {
      return Err(ConfigError::InvalidRules(format!(
        "grade bands must be descending, got {:?}",
        self.grade_bands
      )));
    }
    let reduction = self.volume.deload_reduction_pct;
    if !(0.0..100.0).contains(&reduction) {
      return Err(ConfigError::InvalidRules(format!(
        "deload reduction must be in 0..100, got {}",
        reduction
      )));
    }
    Ok(())
  }
}
