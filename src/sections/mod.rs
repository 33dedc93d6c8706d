//! Password criteria sections
//!
//! Each section decides a single criterion. Sections never fail: every
//! string, including the empty one, yields a plain yes/no.

mod length;
mod variety;

pub use length::{MIN_LENGTH, length_section};
pub use variety::{digit_section, lowercase_section, symbol_section, uppercase_section};

use crate::config::CriteriaPolicy;
use secrecy::SecretString;

/// Signature shared by every criterion section.
pub type SectionFn = fn(&SecretString, &CriteriaPolicy) -> bool;

/// The five scored criteria, in declaration (and suggestion) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    MinLength,
    Lowercase,
    Uppercase,
    Digit,
    Symbol,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::MinLength,
        Criterion::Lowercase,
        Criterion::Uppercase,
        Criterion::Digit,
        Criterion::Symbol,
    ];

    /// Fixed advice shown when this criterion is not met.
    pub fn suggestion(self) -> &'static str {
        match self {
            Criterion::MinLength => "Make your password at least 8 characters long.",
            Criterion::Lowercase => "Add lowercase letters.",
            Criterion::Uppercase => "Add uppercase letters.",
            Criterion::Digit => "Add numbers.",
            Criterion::Symbol => "Add special characters (like !, @, #, or $).",
        }
    }

    pub(crate) fn section(self) -> SectionFn {
        match self {
            Criterion::MinLength => length_section,
            Criterion::Lowercase => lowercase_section,
            Criterion::Uppercase => uppercase_section,
            Criterion::Digit => digit_section,
            Criterion::Symbol => symbol_section,
        }
    }
}

/// Outcome of every criterion for one password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CriterionResult {
    pub has_min_length: bool,
    pub has_lower: bool,
    pub has_upper: bool,
    pub has_digit: bool,
    pub has_symbol: bool,
}

impl CriterionResult {
    pub fn get(&self, criterion: Criterion) -> bool {
        match criterion {
            Criterion::MinLength => self.has_min_length,
            Criterion::Lowercase => self.has_lower,
            Criterion::Uppercase => self.has_upper,
            Criterion::Digit => self.has_digit,
            Criterion::Symbol => self.has_symbol,
        }
    }

    pub(crate) fn set(&mut self, criterion: Criterion, value: bool) {
        match criterion {
            Criterion::MinLength => self.has_min_length = value,
            Criterion::Lowercase => self.has_lower = value,
            Criterion::Uppercase => self.has_upper = value,
            Criterion::Digit => self.has_digit = value,
            Criterion::Symbol => self.has_symbol = value,
        }
    }

    /// Number of satisfied criteria (0..=5).
    pub fn satisfied_count(&self) -> u8 {
        Criterion::ALL.iter().filter(|&&c| self.get(c)).count() as u8
    }

    /// Unmet criteria, in declaration order.
    pub fn failed(&self) -> impl Iterator<Item = Criterion> + '_ {
        Criterion::ALL.into_iter().filter(|&c| !self.get(c))
    }
}
