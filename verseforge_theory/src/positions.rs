// Chord-to-position tables.
//
// Guitar voicings for the chords the app's chord finder knows: every
// natural-root major and minor triad plus a set of C extensions (`C7`,
// `Cmaj7`, `Cm7`, `Cdim`, `Caug`, `Csus2`, `Csus4`, `Cadd9`, `C6`, `C9`).
// The table is data, not code: `data/chord_positions.json` is compiled in
// as the built-in table, and `ChordPositionTable::load` reads a replacement
// from disk.
//
// Strings in a position run from the low E (index 0) to the high E
// (index 5), the order a chord diagram reads left to right. This is the
// reverse of fretboard.rs, which counts from the high E. `None` marks a
// muted string. Frets are absolute, not relative to `base_fret`.
//
// Positions for a chord are sorted by their lowest fretted note, so open
// shapes come first and all-open shapes last.

use crate::error::Result;
use crate::fretboard::{FretNote, STRING_COUNT, fret_note};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

const BUILTIN_TABLE: &str = include_str!("../data/chord_positions.json");

/// One way to finger a chord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordPosition {
    /// Fret per string, low E first. `None` = muted.
    pub frets: [Option<u8>; STRING_COUNT],
    /// Finger per string (1 = index, 0 = open). `None` = muted.
    pub fingers: [Option<u8>; STRING_COUNT],
    /// Fret the diagram starts at.
    pub base_fret: u8,
    /// Fingers that barre across strings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub barres: Vec<u8>,
    /// Display name, e.g. `Barre (3rd fret)`.
    pub name: String,
}

impl ChordPosition {
    /// Lowest fretted (non-open) fret, or None for an all-open shape.
    pub fn lowest_fret(&self) -> Option<u8> {
        self.frets.iter().flatten().copied().filter(|&f| f > 0).min()
    }

    pub fn is_barre(&self) -> bool {
        !self.barres.is_empty()
    }

    /// Diagram indices (low E = 0) of muted strings.
    pub fn muted_strings(&self) -> Vec<usize> {
        (0..STRING_COUNT).filter(|&i| self.frets[i].is_none()).collect()
    }

    /// Notes that sound, low string first.
    pub fn sounding_notes(&self) -> Vec<FretNote> {
        self.frets
            .iter()
            .enumerate()
            .filter_map(|(i, fret)| {
                let fret = (*fret)?;
                fret_note(STRING_COUNT - 1 - i, fret).ok()
            })
            .collect()
    }
}

/// Chord name -> voicings, lowest position first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChordPositionTable {
    chords: BTreeMap<String, Vec<ChordPosition>>,
}

impl ChordPositionTable {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let mut table: ChordPositionTable = serde_json::from_str(data)?;
        for positions in table.chords.values_mut() {
            // Stable, so equal-fret shapes keep their table order.
            positions.sort_by_key(|p| p.lowest_fret().unwrap_or(u8::MAX));
        }
        Ok(table)
    }

    /// The compiled-in table.
    pub fn builtin() -> &'static ChordPositionTable {
        static TABLE: OnceLock<ChordPositionTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            ChordPositionTable::from_json(BUILTIN_TABLE).unwrap_or_else(|e| {
                tracing::error!(error = %e, "built-in chord position table is invalid");
                ChordPositionTable::default()
            })
        })
    }

    /// Voicings for `name`. `♭`/`♯` spellings are accepted; unknown chords
    /// have none.
    pub fn get(&self, name: &str) -> &[ChordPosition] {
        let normalized = name.trim().replace('♭', "b").replace('♯', "#");
        self.chords
            .get(&normalized)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn chord_names(&self) -> impl Iterator<Item = &str> {
        self.chords.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}

/// Voicings for `name` from the built-in table.
pub fn get_chord_positions(name: &str) -> &'static [ChordPosition] {
    ChordPositionTable::builtin().get(name)
}
