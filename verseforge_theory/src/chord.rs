// Chords as the progression engine sees them.
//
// A `Chord` is a triad root + quality, tagged with the roman numeral it
// plays in the current key and whether it was borrowed from the parallel
// mode. Chords are small `Copy` values; pools and progressions are plain
// `Vec`s of them.
//
// Identity for "already used in this line" is `(root, quality)` only
// (`ChordId`). A borrowed `i` and a diatonic `vi` never collide, but two
// labels that land on the same triad do, and the first one placed wins.
//
// The roman numerals are a closed enum covering every label the pool
// builder can emit. Labels print with `♭` and `°`; parsing also accepts
// the ASCII spellings `b` and `o`.

use crate::error::{Result, TheoryError};
use crate::function::HarmonicFunction;
use crate::mode::KeyMode;
use crate::note::PitchClass;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Triad qualities the progression engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
}

impl ChordQuality {
    /// Semitones above the root for each chord tone.
    pub fn intervals(self) -> [u8; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
            ChordQuality::Diminished => [0, 3, 6],
        }
    }

    /// Suffix appended to the root in chord symbols.
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "°",
        }
    }
}

/// Every roman numeral the chord pools can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RomanNumeral {
    // Major-key diatonic
    I,
    MinorII,
    MinorIII,
    IV,
    V,
    MinorVI,
    DimVII,
    // Minor-key diatonic
    MinorI,
    DimII,
    FlatIII,
    MinorIV,
    MinorV,
    FlatVI,
    FlatVII,
    // Parallel-major color in a minor key
    VI,
}

impl RomanNumeral {
    pub const ALL: [RomanNumeral; 15] = [
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
        RomanNumeral::VI,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RomanNumeral::I => "I",
            RomanNumeral::MinorII => "ii",
            RomanNumeral::MinorIII => "iii",
            RomanNumeral::IV => "IV",
            RomanNumeral::V => "V",
            RomanNumeral::MinorVI => "vi",
            RomanNumeral::DimVII => "vii°",
            RomanNumeral::MinorI => "i",
            RomanNumeral::DimII => "ii°",
            RomanNumeral::FlatIII => "♭III",
            RomanNumeral::MinorIV => "iv",
            RomanNumeral::MinorV => "v",
            RomanNumeral::FlatVI => "♭VI",
            RomanNumeral::FlatVII => "♭VII",
            RomanNumeral::VI => "VI",
        }
    }

    /// Look up a label, accepting `b`/`o` for `♭`/`°`. Unknown labels
    /// return None.
    pub fn from_label(label: &str) -> Option<RomanNumeral> {
        let normalized = normalize_label(label);
        RomanNumeral::ALL
            .into_iter()
            .find(|r| r.label() == normalized)
    }

    /// `I` or `i`: the chord a first line opens on.
    pub fn is_tonic_triad(self) -> bool {
        matches!(self, RomanNumeral::I | RomanNumeral::MinorI)
    }

    pub fn function(self) -> HarmonicFunction {
        HarmonicFunction::of(self)
    }
}

fn normalize_label(label: &str) -> String {
    let trimmed = label.trim();
    let mut out = String::with_capacity(trimmed.len() + 2);
    let mut chars = trimmed.chars().peekable();
    if let Some(&'b') = chars.peek() {
        chars.next();
        out.push('♭');
    }
    for c in chars {
        out.push(c);
    }
    if out.ends_with('o') {
        out.pop();
        out.push('°');
    }
    out
}

impl fmt::Display for RomanNumeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RomanNumeral {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        RomanNumeral::from_label(s).ok_or_else(|| TheoryError::InvalidRomanNumeral(s.to_string()))
    }
}

impl TryFrom<String> for RomanNumeral {
    type Error = TheoryError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RomanNumeral> for String {
    fn from(r: RomanNumeral) -> String {
        r.label().to_string()
    }
}

/// The `(root, quality)` pair that identifies a chord within a line.
pub type ChordId = (PitchClass, ChordQuality);

/// A chord in a key, tagged with its function label and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    pub root: PitchClass,
    pub quality: ChordQuality,
    pub roman: RomanNumeral,
    pub is_borrowed: bool,
    /// Mode of the parallel key this chord was borrowed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_from: Option<KeyMode>,
}

impl Chord {
    pub fn diatonic(root: PitchClass, quality: ChordQuality, roman: RomanNumeral) -> Self {
        Chord {
            root,
            quality,
            roman,
            is_borrowed: false,
            borrowed_from: None,
        }
    }

    pub fn borrowed(
        root: PitchClass,
        quality: ChordQuality,
        roman: RomanNumeral,
        from: KeyMode,
    ) -> Self {
        Chord {
            root,
            quality,
            roman,
            is_borrowed: true,
            borrowed_from: Some(from),
        }
    }

    pub fn id(&self) -> ChordId {
        (self.root, self.quality)
    }

    /// Chord symbol: `C`, `Dm`, `B°`.
    pub fn name(&self) -> String {
        format!("{}{}", self.root, self.quality.suffix())
    }

    /// Human label for the borrow source, e.g. `parallel minor`.
    pub fn borrowed_from_label(&self) -> Option<String> {
        self.borrowed_from.map(|m| format!("parallel {m}"))
    }

    pub fn function(&self) -> HarmonicFunction {
        self.roman.function()
    }

    /// Chord tones as pitch classes, root first.
    pub fn tones(&self) -> [PitchClass; 3] {
        self.quality
            .intervals()
            .map(|iv| self.root.transpose(iv as i32))
    }

    /// Chord tones spelled with a fixed octave suffix (`C4 E4 G4`). The
    /// octave does not roll over when a tone wraps past B.
    pub fn note_names(&self, octave: i8) -> Vec<String> {
        self.tones()
            .iter()
            .map(|pc| pc.with_octave(octave))
            .collect()
    }

    /// MIDI voicing used for export: root at octave 3 (C = 48), the triad
    /// above it, and the root doubled an octave up.
    pub fn midi_notes(&self) -> [u8; 4] {
        let root = self.root.midi_number(3);
        let [_, third, fifth] = self.quality.intervals();
        [root, root + third, root + fifth, root + 12]
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.roman)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_names() {
        let c = Chord::diatonic(PitchClass::C, ChordQuality::Major, RomanNumeral::I);
        let dm = Chord::diatonic(PitchClass::D, ChordQuality::Minor, RomanNumeral::MinorII);
        let bdim = Chord::diatonic(PitchClass::B, ChordQuality::Diminished, RomanNumeral::DimVII);
        assert_eq!(c.name(), "C");
        assert_eq!(dm.name(), "Dm");
        assert_eq!(bdim.name(), "B°");
        assert_eq!(dm.to_string(), "Dm (ii)");
    }

    #[test]
    fn test_roman_labels_roundtrip_and_ascii_aliases() {
        for r in RomanNumeral::ALL {
            assert_eq!(RomanNumeral::from_label(r.label()), Some(r));
        }
        assert_eq!(RomanNumeral::from_label("bVII"), Some(RomanNumeral::FlatVII));
        assert_eq!(RomanNumeral::from_label("viio"), Some(RomanNumeral::DimVII));
        assert_eq!(RomanNumeral::from_label("  iv "), Some(RomanNumeral::MinorIV));
        assert_eq!(RomanNumeral::from_label("II"), None);
        assert!("bII".parse::<RomanNumeral>().is_err());
    }

    #[test]
    fn test_tones_and_note_names() {
        let a_minor = Chord::diatonic(PitchClass::A, ChordQuality::Minor, RomanNumeral::MinorVI);
        let names: Vec<&str> = a_minor.tones().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["A", "C", "E"]);
        assert_eq!(a_minor.note_names(4), ["A4", "C4", "E4"]);
    }

    #[test]
    fn test_midi_voicing() {
        let g = Chord::diatonic(PitchClass::G, ChordQuality::Major, RomanNumeral::V);
        assert_eq!(g.midi_notes(), [55, 59, 62, 67]);
        let bdim = Chord::diatonic(PitchClass::B, ChordQuality::Diminished, RomanNumeral::DimVII);
        assert_eq!(bdim.midi_notes(), [59, 62, 65, 71]);
    }

    #[test]
    fn test_identity_ignores_roman() {
        let borrowed = Chord::borrowed(
            PitchClass::C,
            ChordQuality::Minor,
            RomanNumeral::MinorI,
            KeyMode::Minor,
        );
        let other = Chord::diatonic(PitchClass::C, ChordQuality::Minor, RomanNumeral::MinorVI);
        assert_eq!(borrowed.id(), other.id());
        assert_eq!(borrowed.borrowed_from_label().as_deref(), Some("parallel minor"));
    }

    #[test]
    fn test_serde_shape() {
        let c = Chord::diatonic(PitchClass::C, ChordQuality::Major, RomanNumeral::I);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(
            json,
            r#"{"root":"C","quality":"major","roman":"I","is_borrowed":false}"#
        );
        let back: Chord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
