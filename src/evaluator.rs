//! Password strength evaluator - criteria scoring and verdict overrides.
//!
//! Scoring is a pure function of the password and the criteria policy.
//! Overrides are a pure function of the base level, the blocklist verdict
//! and the breach status.

use secrecy::SecretString;

use crate::breach::BreachStatus;
use crate::config::CriteriaPolicy;
use crate::sections::{Criterion, CriterionResult};

/// Highest possible score, one point per criterion.
pub const MAX_SCORE: u8 = 5;

/// Count of satisfied criteria, 0..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrengthScore(u8);

impl StrengthScore {
    pub fn value(self) -> u8 {
        self.0
    }

    /// Fixed thresholds: 0-2 weak, 3-4 moderate, 5 strong.
    pub fn level(self) -> StrengthLevel {
        match self.0 {
            0..=2 => StrengthLevel::Weak,
            MAX_SCORE.. => StrengthLevel::Strong,
            _ => StrengthLevel::Moderate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StrengthLevel {
    Weak,
    Moderate,
    Strong,
}

impl StrengthLevel {
    pub fn label(self) -> &'static str {
        match self {
            StrengthLevel::Weak => "Weak",
            StrengthLevel::Moderate => "Moderate",
            StrengthLevel::Strong => "Strong",
        }
    }

    /// Fill of a strength meter, in percent.
    pub fn meter_percent(self) -> u8 {
        match self {
            StrengthLevel::Weak => 33,
            StrengthLevel::Moderate => 66,
            StrengthLevel::Strong => 100,
        }
    }
}

/// Why a level was forced down to [`StrengthLevel::Weak`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideReason {
    CommonPassword,
    Breached,
    /// Both the blocklist and the breach lookup flagged it.
    CommonAndBreached,
}

/// Base evaluation, before any override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub criteria: CriterionResult,
    pub score: StrengthScore,
    pub level: StrengthLevel,
}

/// Level after overrides, with the reason when one applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub level: StrengthLevel,
    pub override_reason: Option<OverrideReason>,
}

/// Evaluates every criterion and derives score and base level.
///
/// Total over all strings: the empty password scores 0.
pub fn evaluate(password: &SecretString, policy: &CriteriaPolicy) -> Evaluation {
    let mut criteria = CriterionResult::default();

    // Orchestrator: execute sections in declaration order
    for criterion in Criterion::ALL {
        let section_fn = criterion.section();
        criteria.set(criterion, section_fn(password, policy));
    }

    let score = StrengthScore(criteria.satisfied_count());
    Evaluation {
        criteria,
        score,
        level: score.level(),
    }
}

/// Forces the level to weak when the password is common or known breached.
///
/// An unknown breach status never triggers the override; the blocklist
/// alone decides in that case.
pub fn apply_overrides(base: StrengthLevel, is_common: bool, breach: &BreachStatus) -> Verdict {
    let override_reason = match (is_common, breach.is_breached()) {
        (true, true) => Some(OverrideReason::CommonAndBreached),
        (true, false) => Some(OverrideReason::CommonPassword),
        (false, true) => Some(OverrideReason::Breached),
        (false, false) => None,
    };
    Verdict {
        level: if override_reason.is_some() {
            StrengthLevel::Weak
        } else {
            base
        },
        override_reason,
    }
}

/// One fixed suggestion per unmet criterion, in declaration order.
pub fn suggestions(criteria: &CriterionResult) -> Vec<String> {
    criteria
        .failed()
        .map(|c| c.suggestion().to_string())
        .collect()
}
