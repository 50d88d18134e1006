use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pattern::MovementPattern;

/// ---------------------------------------------------------------------------
/// Findings
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Blocking,
  Warning,
  Info,
  Success,
}

impl std::fmt::Display for Severity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Blocking => write!(f, "blocking"),
      Self::Warning => write!(f, "warning"),
      Self::Info => write!(f, "info"),
      Self::Success => write!(f, "success"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
  pub id: String,
  pub severity: Severity,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub suggested_fix: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub entry_index: Option<usize>,
}

impl ValidationFinding {
  fn new(id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      severity,
      message: message.into(),
      suggested_fix: None,
      entry_index: None,
    }
  }

  /// Blocking findings always carry a fix suggestion
  pub fn blocking(id: impl Into<String>, message: impl Into<String>, fix: impl Into<String>) -> Self {
    Self::new(id, Severity::Blocking, message).with_fix(fix)
  }

  pub fn warning(id: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(id, Severity::Warning, message)
  }

  pub fn info(id: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(id, Severity::Info, message)
  }

  pub fn success(id: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(id, Severity::Success, message)
  }

  pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
    self.suggested_fix = Some(fix.into());
    self
  }

  pub fn at(mut self, index: usize) -> Self {
    self.entry_index = Some(index);
    self
  }

  pub fn is_blocking(&self) -> bool {
    self.severity == Severity::Blocking
  }
}

impl std::fmt::Display for ValidationFinding {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}] {}: {}", self.severity, self.id, self.message)?;
    if let Some(fix) = &self.suggested_fix {
      write!(f, " (fix: {})", fix)?;
    }
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Validation Result
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
  Valid,
  Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationStats {
  pub total_exercises: usize,
  /// Entries that are neither warm-up nor cool-down
  pub main_exercises: usize,
  pub total_sets: u32,
  pub boxing_rounds: u32,
  pub strength_exercises: usize,
  pub estimated_minutes: u32,
  pub pattern_counts: BTreeMap<MovementPattern, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
  pub is_valid: bool,
  pub status: ValidationStatus,
  pub blocking_findings: Vec<ValidationFinding>,
  pub other_findings: Vec<ValidationFinding>,
  pub stats: ValidationStats,
}

impl ValidationResult {
  /// Split findings by severity. Validity depends on blocking findings only.
  pub fn from_findings(findings: Vec<ValidationFinding>, stats: ValidationStats) -> Self {
    let (blocking_findings, other_findings): (Vec<_>, Vec<_>) =
      findings.into_iter().partition(ValidationFinding::is_blocking);
    let is_valid = blocking_findings.is_empty();
    Self {
      is_valid,
      status: if is_valid { ValidationStatus::Valid } else { ValidationStatus::Blocked },
      blocking_findings,
      other_findings,
      stats,
    }
  }

  pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
    self.other_findings.iter().filter(|f| f.severity == Severity::Warning)
  }

  pub fn has_finding(&self, id: &str) -> bool {
    self.blocking_findings.iter().chain(self.other_findings.iter()).any(|f| f.id == id)
  }

  pub fn blocking_ids(&self) -> Vec<&str> {
    self.blocking_findings.iter().map(|f| f.id.as_str()).collect()
  }
}

/// ---------------------------------------------------------------------------
/// Scoring
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Volume,
  Sequencing,
  Biomechanics,
  SportSpecificity,
  Safety,
  Context,
  Sfr,
  AdvancedScience,
}

impl Category {
  pub const ALL: [Category; 8] = [
    Self::Volume,
    Self::Sequencing,
    Self::Biomechanics,
    Self::SportSpecificity,
    Self::Safety,
    Self::Context,
    Self::Sfr,
    Self::AdvancedScience,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      Self::Volume => "Volume",
      Self::Sequencing => "Sequencing",
      Self::Biomechanics => "Biomechanics",
      Self::SportSpecificity => "Sport specificity",
      Self::Safety => "Safety",
      Self::Context => "Context",
      Self::Sfr => "Stimulus-to-fatigue",
      Self::AdvancedScience => "Advanced science",
    }
  }
}

impl std::fmt::Display for Category {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.label())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
  pub score: f64,
  pub findings: Vec<ValidationFinding>,
}

impl CategoryScore {
  pub fn new(score: f64, findings: Vec<ValidationFinding>) -> Self {
    Self { score, findings }
  }

  pub fn neutral(finding: ValidationFinding) -> Self {
    Self::new(50.0, vec![finding])
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
  #[serde(rename = "A+")]
  APlus,
  A,
  B,
  C,
  D,
  F,
}

impl Grade {
  /// Map a 0-100 score through descending band floors (A+, A, B, C, D)
  pub fn from_score(score: u8, bands: &[u8; 5]) -> Self {
    let grades = [Self::APlus, Self::A, Self::B, Self::C, Self::D];
    grades
      .iter()
      .zip(bands.iter())
      .find(|(_, floor)| score >= **floor)
      .map(|(grade, _)| *grade)
      .unwrap_or(Self::F)
  }
}

impl std::fmt::Display for Grade {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::APlus => write!(f, "A+"),
      Self::A => write!(f, "A"),
      Self::B => write!(f, "B"),
      Self::C => write!(f, "C"),
      Self::D => write!(f, "D"),
      Self::F => write!(f, "F"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
  pub overall_score: u8,
  pub grade: Grade,
  pub per_category: BTreeMap<Category, CategoryScore>,
}

impl ScoreReport {
  pub fn category(&self, category: Category) -> Option<&CategoryScore> {
    self.per_category.get(&category)
  }

  /// Human-readable report, one line per category followed by its findings
  pub fn summary_lines(&self) -> Vec<String> {
    let mut lines = vec![format!("Overall: {}/100 ({})", self.overall_score, self.grade)];
    for (category, detail) in &self.per_category {
      lines.push(format!("{}: {:.0}/100", category, detail.score));
      for finding in &detail.findings {
        lines.push(format!("  - [{}] {}", finding.severity, finding.message));
      }
    }
    lines
  }
}
