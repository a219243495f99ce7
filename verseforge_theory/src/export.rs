// Plain-text progression export.
//
// The format is what the app copies to the clipboard for pasting into a
// lyric sheet. Each line renders as chord names, then roman numerals, then
// an optional note listing its borrowed chords, then a blank line:
//
//     LINE 1:  C  -  A#  -  F  -  C
//     (Roman): I  -  ♭VII  -  IV  -  I
//              [Borrowed from parallel minor: ♭VII (A#)]
//
// The borrowed note names the source of the line's first borrowed chord;
// pools only ever borrow from one parallel mode, so it covers them all.

use crate::chord::Chord;
use crate::progression::Progression;
use std::fmt::Write;

const SEPARATOR: &str = "  -  ";

/// Render a whole progression as clipboard text.
pub fn format_progression_text(progression: &Progression) -> String {
    let mut text = String::new();
    for (i, line) in progression.iter().enumerate() {
        write_line(&mut text, i + 1, line);
    }
    text
}

fn write_line(out: &mut String, number: usize, line: &[Chord]) {
    let names: Vec<String> = line.iter().map(Chord::name).collect();
    let romans: Vec<&str> = line.iter().map(|c| c.roman.label()).collect();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "LINE {number}:  {}", names.join(SEPARATOR));
    let _ = writeln!(out, "(Roman): {}", romans.join(SEPARATOR));

    let borrowed: Vec<&Chord> = line.iter().filter(|c| c.is_borrowed).collect();
    if let Some(first) = borrowed.first() {
        let source = first.borrowed_from_label().unwrap_or_default();
        let listed: Vec<String> = borrowed
            .iter()
            .map(|c| format!("{} ({})", c.roman, c.name()))
            .collect();
        let _ = writeln!(out, "         [Borrowed from {source}: {}]", listed.join(", "));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{ChordQuality, RomanNumeral};
    use crate::mode::KeyMode;
    use crate::note::PitchClass;

    fn c() -> Chord {
        Chord::diatonic(PitchClass::C, ChordQuality::Major, RomanNumeral::I)
    }

    fn f() -> Chord {
        Chord::diatonic(PitchClass::F, ChordQuality::Major, RomanNumeral::IV)
    }

    fn g() -> Chord {
        Chord::diatonic(PitchClass::G, ChordQuality::Major, RomanNumeral::V)
    }

    #[test]
    fn test_plain_lines() {
        let text = format_progression_text(&vec![vec![c(), f(), g(), c()], vec![c(), g()]]);
        assert_eq!(
            text,
            "LINE 1:  C  -  F  -  G  -  C\n\
             (Roman): I  -  IV  -  V  -  I\n\
             \n\
             LINE 2:  C  -  G\n\
             (Roman): I  -  V\n\
             \n"
        );
    }

    #[test]
    fn test_borrowed_annotation() {
        let flat_seven = Chord::borrowed(
            PitchClass::new(10),
            ChordQuality::Major,
            RomanNumeral::FlatVII,
            KeyMode::Minor,
        );
        let minor_four = Chord::borrowed(
            PitchClass::F,
            ChordQuality::Minor,
            RomanNumeral::MinorIV,
            KeyMode::Minor,
        );
        let text = format_progression_text(&vec![vec![c(), flat_seven, minor_four, c()]]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "LINE 1:  C  -  A#  -  Fm  -  C");
        assert_eq!(lines[1], "(Roman): I  -  ♭VII  -  iv  -  I");
        assert_eq!(
            lines[2],
            "         [Borrowed from parallel minor: ♭VII (A#), iv (Fm)]"
        );
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_empty_progression() {
        assert_eq!(format_progression_text(&Vec::new()), "");
    }
}
