// Line/progression assembly.
//
// A progression is a list of lines (one per lyric line), each a list of
// chords. For every line the assembler:
//
// 1. filters the key's pool by that line's `LineType`,
// 2. opens the line with `ChordSelector::line_start`,
// 3. appends chords with `ChordSelector::next_chord` until the line is full,
//    tracking `(root, quality)` pairs already used in the line.
//
// Shape is guaranteed: exactly `num_lines` lines of exactly
// `chords_per_line` chords, or an error. Counts of zero and line types that
// filter every chord away are configuration errors reported before any
// chord is drawn for that line.
//
// The only randomness comes from the caller's `UniformSource`; the same
// source state and inputs always produce the same progression.

use crate::chord::{Chord, ChordId, ChordQuality, RomanNumeral};
use crate::config::{DEFAULT_RESOLUTION_BOOST, GeneratorConfig};
use crate::error::{Result, TheoryError};
use crate::markov::TransitionWeights;
use crate::mode::KeyMode;
use crate::select::ChordSelector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use verseforge_prng::UniformSource;

/// Lines of chords, outermost index = line.
pub type Progression = Vec<Vec<Chord>>;

/// Per-line restriction on which pool chords may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineType {
    /// Diatonic major triads only.
    MajorOnly,
    /// Diatonic minor triads only.
    MinorOnly,
    /// Major triads plus every borrowed chord.
    MajorBorrowed,
    #[default]
    All,
    /// The handful of chords most country songs live on.
    CountryStandard,
}

impl LineType {
    pub const ALL: [LineType; 5] = [
        LineType::MajorOnly,
        LineType::MinorOnly,
        LineType::MajorBorrowed,
        LineType::All,
        LineType::CountryStandard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LineType::MajorOnly => "major-only",
            LineType::MinorOnly => "minor-only",
            LineType::MajorBorrowed => "major-borrowed",
            LineType::All => "all",
            LineType::CountryStandard => "country-standard",
        }
    }

    /// Whether `chord` survives this line type in a key of `mode`.
    pub fn admits(self, chord: &Chord, mode: KeyMode) -> bool {
        match self {
            LineType::MajorOnly => chord.quality == ChordQuality::Major && !chord.is_borrowed,
            LineType::MinorOnly => chord.quality == ChordQuality::Minor && !chord.is_borrowed,
            LineType::MajorBorrowed => chord.quality == ChordQuality::Major || chord.is_borrowed,
            LineType::All => true,
            LineType::CountryStandard => country_standard(mode).contains(&chord.roman),
        }
    }

    /// Pool chords this line type admits, in pool order.
    pub fn filter(self, pool: &[Chord], mode: KeyMode) -> Vec<Chord> {
        pool.iter().copied().filter(|c| self.admits(c, mode)).collect()
    }
}

/// Numerals a "country-standard" line may use.
fn country_standard(mode: KeyMode) -> &'static [RomanNumeral] {
    match mode {
        KeyMode::Major => &[
            RomanNumeral::I,
            RomanNumeral::IV,
            RomanNumeral::V,
            RomanNumeral::MinorVI,
        ],
        KeyMode::Minor => &[
            RomanNumeral::MinorI,
            RomanNumeral::MinorIV,
            RomanNumeral::MinorV,
            RomanNumeral::FlatVII,
            RomanNumeral::IV,
            RomanNumeral::V,
        ],
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineType {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        LineType::ALL
            .into_iter()
            .find(|lt| lt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TheoryError::InvalidLineType(s.to_string()))
    }
}

/// Assembles progressions from a weight table and resolution boost.
#[derive(Debug, Clone)]
pub struct ProgressionGenerator {
    weights: TransitionWeights,
    resolution_boost: u32,
}

impl Default for ProgressionGenerator {
    fn default() -> Self {
        ProgressionGenerator::new(TransitionWeights::default(), DEFAULT_RESOLUTION_BOOST)
    }
}

impl ProgressionGenerator {
    pub fn new(weights: TransitionWeights, resolution_boost: u32) -> Self {
        ProgressionGenerator {
            weights,
            resolution_boost,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Ok(ProgressionGenerator::new(
            TransitionWeights::from_config(config)?,
            config.resolution_boost,
        ))
    }

    pub fn weights(&self) -> &TransitionWeights {
        &self.weights
    }

    fn selector(&self) -> ChordSelector<'_> {
        ChordSelector::new(&self.weights, self.resolution_boost)
    }

    /// Generate `num_lines` lines of `chords_per_line` chords each.
    ///
    /// `line_types[i]` filters line `i`; missing entries mean `All`.
    pub fn generate(
        &self,
        pool: &[Chord],
        num_lines: usize,
        chords_per_line: usize,
        line_types: &[LineType],
        mode: KeyMode,
        source: &mut impl UniformSource,
    ) -> Result<Progression> {
        if num_lines == 0 {
            return Err(TheoryError::NonPositive { what: "num_lines" });
        }
        if chords_per_line == 0 {
            return Err(TheoryError::NonPositive {
                what: "chords_per_line",
            });
        }

        // Validate every line's pool before drawing anything.
        let line_pools = (0..num_lines)
            .map(|i| {
                let line_type = line_types.get(i).copied().unwrap_or_default();
                let filtered = line_type.filter(pool, mode);
                if filtered.is_empty() {
                    Err(TheoryError::EmptyLinePool {
                        line: i + 1,
                        line_type: line_type.to_string(),
                    })
                } else {
                    Ok(filtered)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut progression = Vec::with_capacity(num_lines);
        for (i, filtered) in line_pools.iter().enumerate() {
            let line = self.generate_line(chords_per_line, filtered, pool, i == 0, source)?;
            tracing::debug!(
                line = i + 1,
                chords = ?line.iter().map(|c| c.roman.label()).collect::<Vec<_>>(),
                "generated line"
            );
            progression.push(line);
        }
        Ok(progression)
    }

    /// Build one line from its filtered pool. `full` backs the selector's
    /// last-resort fallback.
    pub fn generate_line(
        &self,
        chords_per_line: usize,
        filtered: &[Chord],
        full: &[Chord],
        first_line: bool,
        source: &mut impl UniformSource,
    ) -> Result<Vec<Chord>> {
        let selector = self.selector();
        let mut line = Vec::with_capacity(chords_per_line);
        let mut used: Vec<ChordId> = Vec::with_capacity(chords_per_line);

        let start = selector.line_start(filtered, first_line, source)?;
        used.push(start.id());
        line.push(start);

        while line.len() < chords_per_line {
            let is_final = line.len() == chords_per_line - 1;
            let last = line[line.len() - 1];
            let next = selector.next_chord(&last, filtered, full, &used, is_final, source)?;
            if !used.contains(&next.id()) {
                used.push(next.id());
            }
            line.push(next);
        }
        Ok(line)
    }
}

/// Generate with the default weight table and resolution boost.
pub fn generate_progression(
    pool: &[Chord],
    num_lines: usize,
    chords_per_line: usize,
    line_types: &[LineType],
    mode: KeyMode,
    source: &mut impl UniformSource,
) -> Result<Progression> {
    ProgressionGenerator::default().generate(
        pool,
        num_lines,
        chords_per_line,
        line_types,
        mode,
        source,
    )
}
