// Transition weights for next-chord selection.
//
// The generator is Markov-style: the weight of each candidate depends only
// on the chord just placed. Two hand-tuned tables are available:
//
// - FunctionPopularity (default): weight = FUNCTION_WEIGHTS[f(from)][f(to)]
//   x POPULARITY[to]. The 3x3 function table encodes tonal motion (T -> PD
//   -> D -> T); the popularity column favors chords common in country and
//   pop writing. Generalizes to any label the classifier knows.
// - RomanMatrix: a direct 14x14 numeral-to-numeral matrix. Numerals outside
//   it (`VI`, and `ii` when it is borrowed into a minor key's grid) get the
//   fallback weight.
//
// Both produce positive integers. Per-transition overrides from the config
// take precedence over either table. The sampling primitive
// (`roulette_index`) lives here too so the selector stays table-agnostic.
//
// All tables are immutable constants; a `TransitionWeights` can be shared
// across threads freely.

use crate::chord::RomanNumeral;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::function::HarmonicFunction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use verseforge_prng::UniformSource;

/// Which base table supplies transition weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightTable {
    #[default]
    FunctionPopularity,
    RomanMatrix,
}

/// Weight used for transitions the roman matrix does not list.
pub const DEFAULT_FALLBACK_WEIGHT: u32 = 3;

/// Rows: from-function. Columns: to-function. Order: T, PD, D.
const FUNCTION_WEIGHTS: [[u32; 3]; 3] = [
    [2, 10, 7], // Tonic
    [3, 1, 10], // Predominant
    [10, 2, 1], // Dominant
];

/// How often each chord shows up in the idiom, independent of context.
fn popularity(roman: RomanNumeral) -> u32 {
    match roman {
        RomanNumeral::I => 10,
        RomanNumeral::IV => 9,
        RomanNumeral::V => 9,
        RomanNumeral::MinorVI => 6,
        RomanNumeral::MinorII => 4,
        RomanNumeral::MinorIII => 2,
        RomanNumeral::DimVII => 1,
        RomanNumeral::MinorIV => 5,
        RomanNumeral::FlatVII => 6,
        RomanNumeral::FlatVI => 3,
        RomanNumeral::FlatIII => 2,
        RomanNumeral::MinorI => 10,
        RomanNumeral::DimII => 2,
        RomanNumeral::MinorV => 8,
        RomanNumeral::VI => 5,
    }
}

/// Numerals covered by `ROMAN_MATRIX`, in row/column order.
const MATRIX_ORDER: [RomanNumeral; 14] = [
    RomanNumeral::I,
    RomanNumeral::MinorII,
    RomanNumeral::MinorIII,
    RomanNumeral::IV,
    RomanNumeral::V,
    RomanNumeral::MinorVI,
    RomanNumeral::DimVII,
    RomanNumeral::MinorI,
    RomanNumeral::DimII,
    RomanNumeral::FlatIII,
    RomanNumeral::MinorIV,
    RomanNumeral::MinorV,
    RomanNumeral::FlatVI,
    RomanNumeral::FlatVII,
];

#[rustfmt::skip]
const ROMAN_MATRIX: [[u32; 14]; 14] = [
    //I  ii iii  IV   V  vi vii°  i  ii° ♭III iv   v  ♭VI ♭VII
    [ 1,  8,  3, 10,  9,  7,  4,  2,  2,  3,  6,  3,  4,  5], // I
    [ 4,  1,  2,  5, 10,  3,  6,  3,  2,  2,  4,  8,  2,  3], // ii
    [ 5,  4,  1,  7,  6,  8,  3,  4,  2,  4,  5,  5,  6,  4], // iii
    [ 8,  6,  3,  1, 10,  5,  4,  6,  3,  3,  2,  9,  4,  6], // IV
    [10,  3,  2,  5,  1,  7,  2,  9,  2,  4,  4,  2,  6,  3], // V
    [ 6,  7,  4,  9,  8,  1,  3,  5,  3,  5,  6,  7,  4,  5], // vi
    [10,  2,  3,  4,  2,  5,  1,  8,  1,  2,  3,  2,  3,  2], // vii°
    [ 3,  5,  2,  7,  9,  4,  2,  1,  6,  8,  9,  8,  7,  6], // i
    [ 4,  2,  2,  5,  8,  3,  3,  3,  1,  5,  6,  9,  4,  4], // ii°
    [ 6,  5,  3,  8,  6,  7,  2,  7,  4,  1,  6,  5,  6,  5], // ♭III
    [ 8,  4,  2,  5,  9,  4,  2,  7,  3,  3,  1, 10,  5,  7], // iv
    [ 8,  3,  2,  4,  2,  5,  2, 10,  2,  5,  4,  1,  6,  4], // v
    [ 7,  4,  3,  6,  8,  4,  2,  6,  3,  5,  5,  7,  1,  7], // ♭VI
    [ 9,  3,  2,  7,  4,  5,  1,  8,  2,  6,  6,  4,  5,  1], // ♭VII
];

fn matrix_slot(roman: RomanNumeral) -> Option<usize> {
    MATRIX_ORDER.iter().position(|&r| r == roman)
}

/// Resolved weight lookup: base table, fallback, and overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionWeights {
    table: WeightTable,
    fallback: u32,
    overrides: BTreeMap<(RomanNumeral, RomanNumeral), u32>,
}

impl Default for TransitionWeights {
    fn default() -> Self {
        TransitionWeights::new(WeightTable::default())
    }
}

impl TransitionWeights {
    pub fn new(table: WeightTable) -> Self {
        TransitionWeights {
            table,
            fallback: DEFAULT_FALLBACK_WEIGHT,
            overrides: BTreeMap::new(),
        }
    }

    /// Build from config: table choice, fallback weight, and overrides.
    /// Override labels must be known roman numerals.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let mut weights =
            TransitionWeights::new(config.weight_table).with_fallback(config.fallback_weight);
        for (from, row) in &config.weight_overrides {
            let from: RomanNumeral = from.parse()?;
            for (to, &w) in row {
                weights = weights.with_override(from, to.parse()?, w);
            }
        }
        Ok(weights)
    }

    /// Weight for matrix misses. Clamped to at least 1.
    pub fn with_fallback(mut self, fallback: u32) -> Self {
        self.fallback = fallback.max(1);
        self
    }

    /// Pin one transition's weight. Clamped to at least 1.
    pub fn with_override(mut self, from: RomanNumeral, to: RomanNumeral, weight: u32) -> Self {
        self.overrides.insert((from, to), weight.max(1));
        self
    }

    pub fn table(&self) -> WeightTable {
        self.table
    }

    pub fn fallback(&self) -> u32 {
        self.fallback
    }

    /// Affinity for moving from `from` to `to`. Always positive.
    pub fn weight(&self, from: RomanNumeral, to: RomanNumeral) -> u32 {
        if let Some(&w) = self.overrides.get(&(from, to)) {
            return w;
        }
        match self.table {
            WeightTable::FunctionPopularity => {
                let fw = FUNCTION_WEIGHTS[from.function().index()][to.function().index()];
                fw * popularity(to)
            }
            WeightTable::RomanMatrix => match (matrix_slot(from), matrix_slot(to)) {
                (Some(r), Some(c)) => ROMAN_MATRIX[r][c],
                _ => self.fallback,
            },
        }
    }

    /// Label-keyed lookup. Unknown labels take the fallback weight.
    pub fn weight_for_labels(&self, from: &str, to: &str) -> u32 {
        match (RomanNumeral::from_label(from), RomanNumeral::from_label(to)) {
            (Some(f), Some(t)) => self.weight(f, t),
            _ => self.fallback,
        }
    }
}

/// Weight between two harmonic functions in the function table.
pub fn function_weight(from: HarmonicFunction, to: HarmonicFunction) -> u32 {
    FUNCTION_WEIGHTS[from.index()][to.index()]
}

/// Roulette-wheel selection over `weights`.
///
/// Draws `u = U[0,1) * total`, then walks the weights in order subtracting
/// each one until `u <= 0`. Returns None for an empty or all-zero slice.
/// A floating-point miss at the end lands on the last index.
pub fn roulette_index(weights: &[u32], source: &mut impl UniformSource) -> Option<usize> {
    let total: u64 = weights.iter().map(|&w| w as u64).sum();
    if total == 0 {
        return None;
    }
    let mut remaining = source.next_f64() * total as f64;
    for (i, &w) in weights.iter().enumerate() {
        remaining -= w as f64;
        if remaining <= 0.0 {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}
