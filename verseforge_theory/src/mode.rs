// Key modes and scale types.
//
// The progression engine works in two key modes, major and natural minor,
// each a seven-degree interval pattern from the tonic. The scale visualizer
// additionally offers the two pentatonic scales, which share the same
// generation path but never feed the chord pool.
//
// This module provides:
// - `KeyMode` (major / minor) with interval patterns and the parallel mode
// - `Key`: a mode plus its tonic pitch class, with degree lookups
// - `ScaleType` and `generate_scale` for the four displayable scales
//
// Used by pool.rs to place the diatonic and borrowed chords.

use crate::error::{Result, TheoryError};
use crate::note::PitchClass;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two key modes the chord engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyMode {
    /// Ionian: W W H W W W H
    Major,
    /// Aeolian (natural minor): W H W W H W W
    Minor,
}

impl KeyMode {
    /// Semitone offsets of degrees 1-7 from the tonic.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            KeyMode::Major => [0, 2, 4, 5, 7, 9, 11],
            KeyMode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// Same tonic, opposite mode. Borrowed chords come from here.
    pub fn parallel(self) -> KeyMode {
        match self {
            KeyMode::Major => KeyMode::Minor,
            KeyMode::Minor => KeyMode::Major,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeyMode::Major => "major",
            KeyMode::Minor => "minor",
        }
    }
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyMode {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(KeyMode::Major),
            "minor" => Ok(KeyMode::Minor),
            _ => Err(TheoryError::InvalidMode(s.to_string())),
        }
    }
}

/// A concrete key: mode plus tonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub tonic: PitchClass,
    pub mode: KeyMode,
}

impl Key {
    pub fn new(tonic: PitchClass, mode: KeyMode) -> Self {
        Key { tonic, mode }
    }

    /// Parse from the UI's `("C#", "minor")` string pair.
    pub fn parse(tonic: &str, mode: &str) -> Result<Self> {
        Ok(Key::new(PitchClass::parse(tonic)?, mode.parse()?))
    }

    /// The same tonic in the opposite mode.
    pub fn parallel(self) -> Key {
        Key::new(self.tonic, self.mode.parallel())
    }

    /// Pitch class of scale degree `degree` (0-based, wraps every 7).
    pub fn degree(self, degree: usize) -> PitchClass {
        self.tonic.transpose(self.mode.intervals()[degree % 7] as i32)
    }

    /// The seven scale notes from the tonic upward.
    pub fn scale(self) -> [PitchClass; 7] {
        std::array::from_fn(|d| self.degree(d))
    }

    /// Scale degree (0-6) of a pitch class, or None if outside the key.
    pub fn degree_of(self, pc: PitchClass) -> Option<usize> {
        let offset = self.tonic.interval_to(pc);
        self.mode.intervals().iter().position(|&iv| iv == offset)
    }

    pub fn contains(self, pc: PitchClass) -> bool {
        self.degree_of(pc).is_some()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}

/// Scales offered by the scale visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleType {
    Major,
    Minor,
    MajorPentatonic,
    MinorPentatonic,
}

impl ScaleType {
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],
        }
    }

    /// Degree labels, parallel to `intervals()`.
    pub fn degree_names(self) -> &'static [&'static str] {
        match self {
            ScaleType::Major => &["Root", "2nd", "3rd", "4th", "5th", "6th", "7th"],
            ScaleType::Minor => &["Root", "2nd", "b3rd", "4th", "5th", "b6th", "b7th"],
            ScaleType::MajorPentatonic => &["Root", "2nd", "3rd", "5th", "6th"],
            ScaleType::MinorPentatonic => &["Root", "b3rd", "4th", "5th", "b7th"],
        }
    }
}

impl From<KeyMode> for ScaleType {
    fn from(mode: KeyMode) -> Self {
        match mode {
            KeyMode::Major => ScaleType::Major,
            KeyMode::Minor => ScaleType::Minor,
        }
    }
}

impl FromStr for ScaleType {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(ScaleType::Major),
            "minor" => Ok(ScaleType::Minor),
            "major-pentatonic" => Ok(ScaleType::MajorPentatonic),
            "minor-pentatonic" => Ok(ScaleType::MinorPentatonic),
            _ => Err(TheoryError::InvalidScaleType(s.to_string())),
        }
    }
}

/// Scale notes for a named root. Fails on anything but a canonical name.
pub fn generate_scale(root: &str, scale: ScaleType) -> Result<Vec<PitchClass>> {
    Ok(scale_notes(PitchClass::parse(root)?, scale))
}

pub fn scale_notes(root: PitchClass, scale: ScaleType) -> Vec<PitchClass> {
    scale
        .intervals()
        .iter()
        .map(|&iv| root.transpose(iv as i32))
        .collect()
}

/// Degree label of `note` within `scale_notes`, e.g. `b3rd`.
pub fn scale_degree_name(
    note: PitchClass,
    scale_notes: &[PitchClass],
    scale: ScaleType,
) -> Option<&'static str> {
    let idx = scale_notes.iter().position(|&n| n == note)?;
    scale.degree_names().get(idx).copied()
}
