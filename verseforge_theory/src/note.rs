// Chromatic pitch-class arithmetic.
//
// Every note in the toolkit is a `PitchClass`: an integer 0-11 with C = 0.
// Names exist in two spellings: the canonical sharp-only array (`NOTES`)
// that the engine parses and emits, and an enharmonic display array
// (`NOTE_DISPLAY`, e.g. `C#/Db`) used only for labeling key pickers.
//
// Parsing accepts canonical names only. Anything else is an
// `InvalidNote` error rather than a silently wrong index.

use crate::error::{Result, TheoryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical note names, indexed by pitch class.
pub const NOTES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Enharmonic display names, indexed by pitch class.
pub const NOTE_DISPLAY: [&str; 12] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

/// One of the twelve chromatic pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const D: PitchClass = PitchClass(2);
    pub const E: PitchClass = PitchClass(4);
    pub const F: PitchClass = PitchClass(5);
    pub const G: PitchClass = PitchClass(7);
    pub const A: PitchClass = PitchClass(9);
    pub const B: PitchClass = PitchClass(11);

    /// Build from any integer, reduced mod 12.
    pub fn new(index: u8) -> Self {
        PitchClass(index % 12)
    }

    /// Parse a canonical name (`C`, `C#`, ... `B`).
    pub fn parse(name: &str) -> Result<Self> {
        NOTES
            .iter()
            .position(|&n| n == name.trim())
            .map(|i| PitchClass(i as u8))
            .ok_or_else(|| TheoryError::InvalidNote(name.to_string()))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Canonical sharp spelling.
    pub fn name(self) -> &'static str {
        NOTES[self.0 as usize]
    }

    /// Enharmonic label for pickers, e.g. `A#/Bb`.
    pub fn display_name(self) -> &'static str {
        NOTE_DISPLAY[self.0 as usize]
    }

    /// Move by `semitones` (either direction), wrapping into 0-11.
    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass((self.0 as i32 + semitones).rem_euclid(12) as u8)
    }

    /// Ascending distance from `self` up to `other`, in 0-11.
    pub fn interval_to(self, other: PitchClass) -> u8 {
        (other.0 + 12 - self.0) % 12
    }

    /// MIDI note number of this pitch class in scientific-pitch `octave`
    /// (C4 = 60).
    pub fn midi_number(self, octave: i8) -> u8 {
        ((octave as i16 + 1) * 12 + self.0 as i16).clamp(0, 127) as u8
    }

    /// Name with octave suffix, e.g. `G#3`.
    pub fn with_octave(self, octave: i8) -> String {
        format!("{}{}", self.name(), octave)
    }

    /// All twelve pitch classes in chromatic order from C.
    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..12).map(PitchClass)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        PitchClass::parse(s)
    }
}

impl TryFrom<String> for PitchClass {
    type Error = TheoryError;

    fn try_from(s: String) -> Result<Self> {
        PitchClass::parse(&s)
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> String {
        pc.name().to_string()
    }
}

/// Name-level transposition: `transpose("A", 3) == "C"`.
pub fn transpose(note: &str, semitones: i32) -> Result<&'static str> {
    Ok(PitchClass::parse(note)?.transpose(semitones).name())
}
