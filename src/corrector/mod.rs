//! Deterministic Corrector
//!
//! A fixed pipeline of rewrite passes that moves a session toward the
//! blocking rules. Every pass:
//! - reads only the rule tables, never the validator
//! - is total: input it cannot map is left as it is
//! - is idempotent, so `correct(correct(s)) == correct(s)`
//! - records what it changed as a `CorrectionNote` on the `Correction`
//!   value threaded through the pipeline

mod fields;
mod fixed;
mod naming;
mod sequencing;
mod sport;
mod structure;
mod sync;
mod volume;

pub use naming::NamingPatterns;

use serde::{Deserialize, Serialize};

use crate::classifier::{is_low_intensity, PatternClassifier};
use crate::fixed_params::FixedParams;
use crate::models::{AthleteContext, ExerciseEntry, MovementPattern, Session, Sport};
use crate::rules::RuleSet;

// ---------------------------------------------------------------------------
/// Correction Pass: one stage of the pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionPass {
    PreScaling,
    Naming,
    Structure,
    Fields,
    PhaseScaling,
    VolumeLimits,
    SportInsertion,
    Sequencing,
    FixedParameters,
    Sync,
}

impl CorrectionPass {
    /// Pipeline order
    pub const ALL: [CorrectionPass; 10] = [
        Self::PreScaling,
        Self::Naming,
        Self::Structure,
        Self::Fields,
        Self::PhaseScaling,
        Self::VolumeLimits,
        Self::SportInsertion,
        Self::Sequencing,
        Self::FixedParameters,
        Self::Sync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreScaling => "pre_scaling",
            Self::Naming => "naming",
            Self::Structure => "structure",
            Self::Fields => "fields",
            Self::PhaseScaling => "phase_scaling",
            Self::VolumeLimits => "volume_limits",
            Self::SportInsertion => "sport_insertion",
            Self::Sequencing => "sequencing",
            Self::FixedParameters => "fixed_parameters",
            Self::Sync => "sync",
        }
    }

    /// Heading used in rendered diffs
    pub fn label(&self) -> &'static str {
        match self {
            Self::PreScaling => "Volume pre-scaling",
            Self::Naming => "Name normalization",
            Self::Structure => "Structural completion",
            Self::Fields => "Missing-field inference",
            Self::PhaseScaling => "Phase-based volume adjustment",
            Self::VolumeLimits => "Per-exercise volume limits",
            Self::SportInsertion => "Sport-specific insertion",
            Self::Sequencing => "Sequencing repair",
            Self::FixedParameters => "Fixed-parameter enforcement",
            Self::Sync => "Name/parameter sync",
        }
    }
}

impl std::fmt::Display for CorrectionPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CorrectionPass {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown correction pass: {}", s))
    }
}

// ---------------------------------------------------------------------------
/// Correction Notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionNote {
    pub pass: CorrectionPass,
    /// Index in the session as it stood when the pass ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for CorrectionNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entry_index {
            Some(index) => write!(f, "[{}] #{}: {}", self.pass, index, self.message),
            None => write!(f, "[{}] {}", self.pass, self.message),
        }
    }
}

/// The session being rewritten plus every note recorded so far
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub session: Session,
    pub notes: Vec<CorrectionNote>,
}

impl Correction {
    fn new(session: Session) -> Self {
        Self {
            session,
            notes: Vec::new(),
        }
    }

    pub(crate) fn note(&mut self, pass: CorrectionPass, entry_index: Option<usize>, message: impl Into<String>) {
        let note = CorrectionNote {
            pass,
            entry_index,
            message: message.into(),
        };
        tracing::debug!(pass = %pass, entry = ?entry_index, message = %note.message, "Correction applied");
        self.notes.push(note);
    }

    pub fn notes_for(&self, pass: CorrectionPass) -> impl Iterator<Item = &CorrectionNote> {
        self.notes.iter().filter(move |n| n.pass == pass)
    }
}

// ---------------------------------------------------------------------------
/// Pass Context: read-only inputs shared by every pass
// ---------------------------------------------------------------------------

pub(crate) struct PassContext<'a> {
    pub rules: &'a RuleSet,
    pub classifier: &'a PatternClassifier,
    pub naming: &'a NamingPatterns,
    pub athlete: &'a AthleteContext,
    pub sport: Sport,
    pub low_intensity: bool,
}

impl PassContext<'_> {
    pub fn pattern(&self, entry: &ExerciseEntry) -> MovementPattern {
        self.classifier.classify(&entry.name)
    }

    pub fn fixed(&self, entry: &ExerciseEntry) -> Option<&FixedParams> {
        self.rules.fixed(self.pattern(entry))
    }

    pub fn is_warmup(&self, entry: &ExerciseEntry) -> bool {
        entry.has_name() && self.classifier.is_warmup(&entry.name)
    }

    pub fn is_cooldown(&self, entry: &ExerciseEntry) -> bool {
        entry.has_name() && self.classifier.is_cooldown(&entry.name)
    }

    /// Named, and neither warm-up nor cool-down
    pub fn is_working(&self, entry: &ExerciseEntry) -> bool {
        entry.has_name() && !self.is_warmup(entry) && !self.is_cooldown(entry)
    }

    pub fn is_compound(&self, entry: &ExerciseEntry) -> bool {
        self.rules.profile(self.pattern(entry)).is_some_and(|p| p.compound)
    }
}

// ---------------------------------------------------------------------------
/// Pipeline
// ---------------------------------------------------------------------------

type PassFn = fn(&mut Correction, &PassContext<'_>);

const PIPELINE: [(CorrectionPass, PassFn); 10] = [
    (CorrectionPass::PreScaling, volume::pre_scale),
    (CorrectionPass::Naming, naming::normalize_names),
    (CorrectionPass::Structure, structure::complete_structure),
    (CorrectionPass::Fields, fields::infer_missing_fields),
    (CorrectionPass::PhaseScaling, volume::phase_scale),
    (CorrectionPass::VolumeLimits, volume::enforce_limits),
    (CorrectionPass::SportInsertion, sport::insert_requirements),
    (CorrectionPass::Sequencing, sequencing::repair_order),
    (CorrectionPass::FixedParameters, fixed::enforce_fixed_parameters),
    (CorrectionPass::Sync, sync::sync_names),
];

/// The corrector bound to one compiled rule set
pub struct Corrector<'a> {
    rules: &'a RuleSet,
    classifier: &'a PatternClassifier,
    naming: &'a NamingPatterns,
}

impl<'a> Corrector<'a> {
    pub fn new(rules: &'a RuleSet, classifier: &'a PatternClassifier, naming: &'a NamingPatterns) -> Self {
        Self {
            rules,
            classifier,
            naming,
        }
    }

    /// Run every pass once, in order
    pub fn correct(&self, session: Session, context: &AthleteContext) -> Correction {
        let cx = PassContext {
            rules: self.rules,
            classifier: self.classifier,
            naming: self.naming,
            athlete: context,
            sport: Sport::resolve(context.sport.as_ref(), session.sport.as_deref()),
            low_intensity: is_low_intensity(&session, context, self.classifier),
        };

        let mut out = Correction::new(session);
        for (pass, run) in PIPELINE {
            let before = out.notes.len();
            run(&mut out, &cx);
            tracing::debug!(pass = %pass, notes = out.notes.len() - before, "Pass finished");
        }
        out
    }
}
