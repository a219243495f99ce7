// Guitar fretboard helpers for standard tuning.
//
// Strings are indexed 0-5 from the thinnest (high E4) to the thickest
// (low E2), the order a tab reads top to bottom. Fret 0 is the open string.
// Octaves follow scientific pitch notation: a fretted note's octave rises
// each time it passes a C, counted from the open string's pitch class.
//
// Power-chord shapes are the two movable three-note forms (root, fifth,
// octave) with the root on the low E or A string.

use crate::error::{Result, TheoryError};
use crate::note::PitchClass;
use serde::Serialize;

/// Open strings, index 0 = high E.
pub const STANDARD_TUNING: [(PitchClass, i8); 6] = [
    (PitchClass::E, 4),
    (PitchClass::B, 3),
    (PitchClass::G, 3),
    (PitchClass::D, 3),
    (PitchClass::A, 2),
    (PitchClass::E, 2),
];

/// Tab labels, index 0 = high E.
pub const STRING_LABELS: [&str; 6] = ["e", "B", "G", "D", "A", "E"];

pub const STRING_COUNT: usize = STANDARD_TUNING.len();

/// A fretted note with its octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FretNote {
    pub note: PitchClass,
    pub octave: i8,
}

impl FretNote {
    /// Scientific spelling, e.g. `G3`.
    pub fn full_name(self) -> String {
        self.note.with_octave(self.octave)
    }
}

fn open_string(string: usize) -> Result<(PitchClass, i8)> {
    STANDARD_TUNING
        .get(string)
        .copied()
        .ok_or(TheoryError::InvalidString(string))
}

/// Note sounding at `fret` on `string`.
pub fn fret_note(string: usize, fret: u8) -> Result<FretNote> {
    let (open, octave) = open_string(string)?;
    let total = open.index() as i32 + fret as i32;
    Ok(FretNote {
        note: PitchClass::new((total % 12) as u8),
        octave: octave + (total / 12) as i8,
    })
}

/// Tab label of `string`.
pub fn string_label(string: usize) -> Result<&'static str> {
    STRING_LABELS
        .get(string)
        .copied()
        .ok_or(TheoryError::InvalidString(string))
}

/// One scale tone on the neck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScalePosition {
    pub string: usize,
    pub fret: u8,
    pub note: FretNote,
    /// The note is the scale's first degree.
    pub is_root: bool,
}

/// Every `(string, fret)` up to `max_fret` whose note is in `scale`,
/// string by string. `scale[0]` is treated as the root.
pub fn scale_positions(scale: &[PitchClass], max_fret: u8) -> Vec<ScalePosition> {
    let root = scale.first().copied();
    let mut positions = Vec::new();
    for string in 0..STRING_COUNT {
        for fret in 0..=max_fret {
            let Ok(note) = fret_note(string, fret) else {
                continue;
            };
            if scale.contains(&note.note) {
                positions.push(ScalePosition {
                    string,
                    fret,
                    note,
                    is_root: Some(note.note) == root,
                });
            }
        }
    }
    positions
}

/// Which string carries a power chord's root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    /// Root on the low E string.
    EShape,
    /// Root on the A string.
    AShape,
}

impl ShapeKind {
    fn root_string(self) -> usize {
        match self {
            ShapeKind::EShape => 5,
            ShapeKind::AShape => 4,
        }
    }
}

/// One fretted note of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FingerPosition {
    pub string: usize,
    pub fret: u8,
    pub note: PitchClass,
    pub is_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerChordShape {
    /// Chord symbol, e.g. `C5`.
    pub name: String,
    pub shape: ShapeKind,
    pub root_fret: u8,
    /// Root, fifth, octave.
    pub fingers: [FingerPosition; 3],
    /// Strings left unplayed.
    pub muted: Vec<usize>,
}

impl PowerChordShape {
    fn new(root: PitchClass, shape: ShapeKind, root_fret: u8) -> Self {
        let s = shape.root_string();
        let fifth = root.transpose(7);
        PowerChordShape {
            name: format!("{root}5"),
            shape,
            root_fret,
            fingers: [
                FingerPosition {
                    string: s,
                    fret: root_fret,
                    note: root,
                    is_root: true,
                },
                FingerPosition {
                    string: s - 1,
                    fret: root_fret + 2,
                    note: fifth,
                    is_root: false,
                },
                FingerPosition {
                    string: s - 2,
                    fret: root_fret + 2,
                    note: root,
                    is_root: true,
                },
            ],
            muted: (0..STRING_COUNT).filter(|&i| i + 2 < s || i > s).collect(),
        }
    }
}

/// Lowest fret on `string` that sounds `note`.
fn lowest_fret(string: usize, note: PitchClass) -> u8 {
    let (open, _) = STANDARD_TUNING[string];
    open.interval_to(note)
}

/// E-shape and A-shape power chords for `root`. A shape whose root sits on
/// fret 0-2 is also given twelve frets up.
pub fn power_chord_shapes(root: PitchClass) -> Vec<PowerChordShape> {
    let mut shapes = Vec::new();
    for kind in [ShapeKind::EShape, ShapeKind::AShape] {
        let fret = lowest_fret(kind.root_string(), root);
        shapes.push(PowerChordShape::new(root, kind, fret));
        if fret <= 2 {
            shapes.push(PowerChordShape::new(root, kind, fret + 12));
        }
    }
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{ScaleType, scale_notes};

    #[test]
    fn test_open_strings() {
        let names: Vec<String> = (0..STRING_COUNT)
            .map(|s| fret_note(s, 0).unwrap().full_name())
            .collect();
        assert_eq!(names, vec!["E4", "B3", "G3", "D3", "A2", "E2"]);
    }

    #[test]
    fn test_fretted_notes_roll_octave_at_c() {
        assert_eq!(fret_note(5, 3).unwrap().full_name(), "G2");
        assert_eq!(fret_note(5, 8).unwrap().full_name(), "C3");
        assert_eq!(fret_note(1, 1).unwrap().full_name(), "C4");
        assert_eq!(fret_note(0, 12).unwrap().full_name(), "E5");
    }

    #[test]
    fn test_invalid_string() {
        assert!(matches!(fret_note(6, 0), Err(TheoryError::InvalidString(6))));
        assert!(matches!(string_label(9), Err(TheoryError::InvalidString(9))));
        assert_eq!(string_label(5).unwrap(), "E");
    }

    #[test]
    fn test_scale_positions() {
        let a_minor_pent = scale_notes(PitchClass::A, ScaleType::MinorPentatonic);
        let positions = scale_positions(&a_minor_pent, 5);
        assert!(positions.iter().all(|p| a_minor_pent.contains(&p.note.note)));
        let low_e: Vec<u8> = positions
            .iter()
            .filter(|p| p.string == 5)
            .map(|p| p.fret)
            .collect();
        assert_eq!(low_e, vec![0, 3, 5]);
        assert!(positions.iter().any(|p| p.string == 5 && p.fret == 5 && p.is_root));
        assert!(positions.iter().filter(|p| p.is_root).all(|p| p.note.note == PitchClass::A));
    }

    #[test]
    fn test_power_chord_shapes() {
        let shapes = power_chord_shapes(PitchClass::G);
        // G on low E is fret 3; on A it is fret 10.
        assert_eq!(shapes.len(), 2);
        let e_shape = &shapes[0];
        assert_eq!(e_shape.name, "G5");
        assert_eq!(e_shape.root_fret, 3);
        assert_eq!(e_shape.fingers[1].note, PitchClass::D);
        assert_eq!(e_shape.muted, vec![0, 1, 2]);
        assert_eq!(shapes[1].shape, ShapeKind::AShape);
        assert_eq!(shapes[1].root_fret, 10);
        assert_eq!(shapes[1].muted, vec![0, 1, 5]);

        // Every finger sounds the note it claims.
        for shape in &shapes {
            for finger in &shape.fingers {
                assert_eq!(fret_note(finger.string, finger.fret).unwrap().note, finger.note);
            }
        }
    }

    #[test]
    fn test_low_roots_get_octave_copy() {
        let shapes = power_chord_shapes(PitchClass::E);
        let frets: Vec<(ShapeKind, u8)> = shapes.iter().map(|s| (s.shape, s.root_fret)).collect();
        assert_eq!(
            frets,
            vec![(ShapeKind::EShape, 0), (ShapeKind::EShape, 12), (ShapeKind::AShape, 7)]
        );
    }
}
