pub mod athlete;
pub mod pattern;
pub mod report;
pub mod session;

pub use athlete::{AthleteContext, ExperienceLevel, FeedbackSummary, Goal, Phase, PeriodizationParams, RpeTrend, Sex, Sport};
pub use pattern::MovementPattern;
pub use report::{
  Category, CategoryScore, Grade, ScoreReport, Severity, ValidationFinding, ValidationResult, ValidationStats,
  ValidationStatus,
};
pub use session::{ExerciseEntry, ExerciseType, ScalingPass, Session};
