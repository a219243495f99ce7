// Harmonic-function classification.
//
// Every roman numeral maps to exactly one of Tonic (rest), Predominant
// (motion away from rest) or Dominant (tension seeking resolution). The
// mapping is a fixed table; the enum-typed lookup is total, and the
// string-typed lookup falls back to Tonic for labels it does not know.
//
// Consumed by markov.rs (function-class weighting) and select.rs
// (choosing the opening chord of non-first lines).

use crate::chord::RomanNumeral;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarmonicFunction {
    Tonic,
    Predominant,
    Dominant,
}

impl HarmonicFunction {
    pub const ALL: [HarmonicFunction; 3] = [
        HarmonicFunction::Tonic,
        HarmonicFunction::Predominant,
        HarmonicFunction::Dominant,
    ];

    pub fn of(roman: RomanNumeral) -> HarmonicFunction {
        use HarmonicFunction::*;
        match roman {
            RomanNumeral::I
            | RomanNumeral::MinorIII
            | RomanNumeral::MinorVI
            | RomanNumeral::MinorI
            | RomanNumeral::FlatIII
            | RomanNumeral::VI => Tonic,
            RomanNumeral::MinorII
            | RomanNumeral::IV
            | RomanNumeral::MinorIV
            | RomanNumeral::DimII
            | RomanNumeral::FlatVI => Predominant,
            RomanNumeral::V
            | RomanNumeral::DimVII
            | RomanNumeral::MinorV
            | RomanNumeral::FlatVII => Dominant,
        }
    }

    /// Classify a raw label. Unknown labels are treated as Tonic so a
    /// hand-entered chord never stalls generation.
    pub fn of_label(label: &str) -> HarmonicFunction {
        match RomanNumeral::from_label(label) {
            Some(roman) => HarmonicFunction::of(roman),
            None => {
                tracing::debug!(label, "unknown roman numeral, classifying as tonic");
                HarmonicFunction::Tonic
            }
        }
    }

    /// Index into 3x3 function tables.
    pub fn index(self) -> usize {
        self as usize
    }
}
