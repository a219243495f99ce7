// Key detection for a single chord.
//
// Given one triad, list the keys it plausibly belongs to: every major and
// natural-minor key where it is diatonic (high confidence), plus major keys
// that would borrow it from the parallel minor (medium confidence). The
// chord finder shows the top six and highlights the first.
//
// Candidates are ranked by confidence, then by how central the chord's
// degree is (tonic, dominant, subdominant, submediant, mediant,
// supertonic, then the rest). Ties keep chromatic key order from C, so
// the ranking is total and deterministic.

use crate::chord::{Chord, ChordQuality, RomanNumeral};
use crate::error::{Result, TheoryError};
use crate::function::HarmonicFunction;
use crate::mode::{Key, KeyMode};
use crate::note::PitchClass;
use crate::pool::diatonic_table;
use serde::Serialize;

/// Most candidates `detect_possible_keys` returns.
pub const MAX_CANDIDATES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// What a chord does in a candidate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegreeFunction {
    Tonic,
    Supertonic,
    Mediant,
    Subdominant,
    Dominant,
    Submediant,
    LeadingTone,
    Subtonic,
    BorrowedSubdominant,
    BorrowedSubtonic,
    BorrowedFromMinor,
}

impl DegreeFunction {
    fn of_degree(mode: KeyMode, degree: usize) -> DegreeFunction {
        use DegreeFunction::*;
        match (degree, mode) {
            (0, _) => Tonic,
            (1, _) => Supertonic,
            (2, _) => Mediant,
            (3, _) => Subdominant,
            (4, _) => Dominant,
            (5, _) => Submediant,
            (_, KeyMode::Major) => LeadingTone,
            (_, KeyMode::Minor) => Subtonic,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DegreeFunction::Tonic => "Tonic",
            DegreeFunction::Supertonic => "Supertonic",
            DegreeFunction::Mediant => "Mediant",
            DegreeFunction::Subdominant => "Subdominant",
            DegreeFunction::Dominant => "Dominant",
            DegreeFunction::Submediant => "Submediant",
            DegreeFunction::LeadingTone => "Leading Tone",
            DegreeFunction::Subtonic => "Subtonic",
            DegreeFunction::BorrowedSubdominant => "Minor Subdominant (borrowed)",
            DegreeFunction::BorrowedSubtonic => "Subtonic (borrowed)",
            DegreeFunction::BorrowedFromMinor => "Borrowed from minor",
        }
    }

    /// Sort rank among candidates of equal confidence; lower is better.
    pub fn rank(self) -> u8 {
        match self {
            DegreeFunction::Tonic => 0,
            DegreeFunction::Dominant => 1,
            DegreeFunction::Subdominant => 2,
            DegreeFunction::Submediant => 3,
            DegreeFunction::Mediant => 4,
            DegreeFunction::Supertonic => 5,
            _ => 6,
        }
    }
}

/// One key a chord could belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyContext {
    pub key: Key,
    pub roman: RomanNumeral,
    pub function: DegreeFunction,
    pub confidence: Confidence,
}

impl KeyContext {
    /// Tonic / predominant / dominant role, as the generator sees it.
    pub fn harmonic_function(&self) -> HarmonicFunction {
        HarmonicFunction::of(self.roman)
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(
            self.function,
            DegreeFunction::BorrowedSubdominant
                | DegreeFunction::BorrowedSubtonic
                | DegreeFunction::BorrowedFromMinor
        )
    }
}

fn diatonic_context(key: Key, root: PitchClass, quality: ChordQuality) -> Option<KeyContext> {
    let degree = key.degree_of(root)?;
    let (expected, roman) = diatonic_table(key.mode)[degree];
    (expected == quality).then_some(KeyContext {
        key,
        roman,
        function: DegreeFunction::of_degree(key.mode, degree),
        confidence: Confidence::High,
    })
}

/// Chords a major key borrows from its parallel minor.
fn borrowed_context(key: Key, root: PitchClass, quality: ChordQuality) -> Option<KeyContext> {
    let (roman, function) = match (key.tonic.interval_to(root), quality) {
        (5, ChordQuality::Minor) => (RomanNumeral::MinorIV, DegreeFunction::BorrowedSubdominant),
        (10, ChordQuality::Major) => (RomanNumeral::FlatVII, DegreeFunction::BorrowedSubtonic),
        (8, ChordQuality::Major) => (RomanNumeral::FlatVI, DegreeFunction::BorrowedFromMinor),
        (3, ChordQuality::Major) => (RomanNumeral::FlatIII, DegreeFunction::BorrowedFromMinor),
        _ => return None,
    };
    Some(KeyContext {
        key,
        roman,
        function,
        confidence: Confidence::Medium,
    })
}

/// Every key a chord fits, best first.
pub fn all_possible_keys(root: PitchClass, quality: ChordQuality) -> Vec<KeyContext> {
    let mut candidates = Vec::new();
    for tonic in PitchClass::all() {
        let major = Key::new(tonic, KeyMode::Major);
        candidates.extend(diatonic_context(major, root, quality));
        candidates.extend(diatonic_context(Key::new(tonic, KeyMode::Minor), root, quality));
        candidates.extend(borrowed_context(major, root, quality));
    }
    candidates.sort_by_key(|c| (std::cmp::Reverse(c.confidence), c.function.rank()));
    tracing::trace!(%root, ?quality, count = candidates.len(), "detected candidate keys");
    candidates
}

/// Up to `MAX_CANDIDATES` keys for a chord, best first. A triad is
/// diatonic to six keys, so borrowed candidates only show up in
/// `all_possible_keys`.
pub fn detect_possible_keys(root: PitchClass, quality: ChordQuality) -> Vec<KeyContext> {
    let mut candidates = all_possible_keys(root, quality);
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// The top-ranked key for a chord, if any.
pub fn best_key_match(root: PitchClass, quality: ChordQuality) -> Option<KeyContext> {
    detect_possible_keys(root, quality).into_iter().next()
}

pub fn detect_keys_for_chord(chord: &Chord) -> Vec<KeyContext> {
    detect_possible_keys(chord.root, chord.quality)
}

/// As `detect_possible_keys`, from a root name. Flat spellings (`Bb`,
/// `E♭`) are accepted alongside the canonical sharps.
pub fn detect_possible_keys_named(root: &str, quality: ChordQuality) -> Result<Vec<KeyContext>> {
    Ok(detect_possible_keys(parse_root(root)?, quality))
}

fn parse_root(name: &str) -> Result<PitchClass> {
    let trimmed = name.trim();
    if let Ok(pc) = PitchClass::parse(trimmed) {
        return Ok(pc);
    }
    let mut chars = trimmed.chars();
    match (chars.next(), chars.as_str()) {
        (Some(letter), "b" | "♭") => {
            Ok(PitchClass::parse(&letter.to_string())
                .map_err(|_| TheoryError::InvalidNote(name.to_string()))?
                .transpose(-1))
        }
        _ => Err(TheoryError::InvalidNote(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(candidates: &[KeyContext]) -> Vec<(String, &'static str)> {
        candidates
            .iter()
            .map(|c| (c.key.to_string(), c.roman.label()))
            .collect()
    }

    #[test]
    fn test_c_major_chord() {
        let keys = detect_possible_keys(PitchClass::C, ChordQuality::Major);
        assert_eq!(
            summary(&keys),
            vec![
                ("C major".to_string(), "I"),
                ("F major".to_string(), "V"),
                ("G major".to_string(), "IV"),
                ("E minor".to_string(), "♭VI"),
                ("A minor".to_string(), "♭III"),
                ("D minor".to_string(), "♭VII"),
            ]
        );
        assert!(keys.iter().all(|k| k.confidence == Confidence::High));
        assert_eq!(keys[0].function, DegreeFunction::Tonic);
        assert_eq!(keys[1].harmonic_function(), HarmonicFunction::Dominant);
        assert_eq!(keys[5].function.label(), "Subtonic");
    }

    #[test]
    fn test_a_minor_chord() {
        let keys = detect_possible_keys(PitchClass::A, ChordQuality::Minor);
        assert_eq!(
            summary(&keys),
            vec![
                ("A minor".to_string(), "i"),
                ("D minor".to_string(), "v"),
                ("E minor".to_string(), "iv"),
                ("C major".to_string(), "vi"),
                ("F major".to_string(), "iii"),
                ("G major".to_string(), "ii"),
            ]
        );
    }

    #[test]
    fn test_diminished_chord() {
        let keys = detect_possible_keys(PitchClass::B, ChordQuality::Diminished);
        assert_eq!(
            summary(&keys),
            vec![("A minor".to_string(), "ii°"), ("C major".to_string(), "vii°")]
        );
        assert_eq!(keys[1].function.label(), "Leading Tone");
    }

    #[test]
    fn test_borrowed_candidates() {
        let keys = all_possible_keys(PitchClass::C, ChordQuality::Major);
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[..6], detect_possible_keys(PitchClass::C, ChordQuality::Major)[..]);
        let borrowed: Vec<(String, &'static str)> = keys[6..]
            .iter()
            .inspect(|k| {
                assert!(k.is_borrowed());
                assert_eq!(k.confidence, Confidence::Medium);
            })
            .map(|k| (k.key.to_string(), k.roman.label()))
            .collect();
        // Same rank, so chromatic key order.
        assert_eq!(
            borrowed,
            vec![
                ("D major".to_string(), "♭VII"),
                ("E major".to_string(), "♭VI"),
                ("A major".to_string(), "♭III"),
            ]
        );

        let minor = all_possible_keys(PitchClass::F, ChordQuality::Minor);
        let iv = minor.iter().find(|k| k.is_borrowed()).unwrap();
        assert_eq!(iv.key.to_string(), "C major");
        assert_eq!(iv.function.label(), "Minor Subdominant (borrowed)");
        assert_eq!(iv.harmonic_function(), HarmonicFunction::Predominant);
    }

    #[test]
    fn test_best_key_match() {
        let best = best_key_match(PitchClass::G, ChordQuality::Major).unwrap();
        assert_eq!(best.key, Key::new(PitchClass::G, KeyMode::Major));
        assert_eq!(best.roman, RomanNumeral::I);

        let chord = Chord::diatonic(PitchClass::E, ChordQuality::Minor, RomanNumeral::MinorIII);
        assert_eq!(detect_keys_for_chord(&chord)[0].key.to_string(), "E minor");
    }

    #[test]
    fn test_flat_root_names() {
        let flat = detect_possible_keys_named("Bb", ChordQuality::Major).unwrap();
        assert_eq!(flat, detect_possible_keys(PitchClass::new(10), ChordQuality::Major));
        assert_eq!(
            detect_possible_keys_named("E♭", ChordQuality::Minor).unwrap()[0].key.to_string(),
            "D# minor"
        );
        assert!(detect_possible_keys_named("H", ChordQuality::Major).is_err());
        assert!(detect_possible_keys_named("Cb", ChordQuality::Major).is_ok());
    }
}
