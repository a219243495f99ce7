// MIDI output from chord progressions.
//
// Converts a `Progression` into a Standard MIDI File (SMF) the user can drop
// into a DAW. Output is SMF Format 1: track 0 carries the tempo, track 1
// carries every chord, laid end to end in line order.
//
// Each chord holds for two beats. Voicing comes from `Chord::midi_notes`
// (root at octave 3, triad, root doubled an octave up), so a C major chord
// sounds as MIDI 48, 52, 55, 60.
//
// Uses the `midly` crate for MIDI writing.

use crate::chord::Chord;
use crate::error::{Result, TheoryError};
use crate::progression::Progression;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Beats each chord is held for.
pub const BEATS_PER_CHORD: u32 = 2;

/// Ticks each chord is held for.
const TICKS_PER_CHORD: u32 = TICKS_PER_QUARTER as u32 * BEATS_PER_CHORD;

/// Note-on velocity, about 80% of full scale.
pub const CHORD_VELOCITY: u8 = 102;

const CHANNEL: u8 = 0;

/// Acoustic guitar (steel), zero-based General MIDI program.
const PROGRAM: u8 = 25;

/// Convert a progression to MIDI and write it to `path`.
pub fn write_midi(progression: &Progression, bpm: u16, path: &Path) -> Result<()> {
    let buf = midi_bytes(progression, bpm)?;
    std::fs::write(path, &buf)?;
    tracing::info!(path = %path.display(), bytes = buf.len(), "wrote MIDI file");
    Ok(())
}

/// Serialize a progression to SMF bytes.
pub fn midi_bytes(progression: &Progression, bpm: u16) -> Result<Vec<u8>> {
    let smf = progression_to_smf(progression, bpm)?;
    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| TheoryError::Midi(e.to_string()))?;
    Ok(buf)
}

/// Convert a progression to an in-memory SMF.
pub fn progression_to_smf(progression: &Progression, bpm: u16) -> Result<Smf<'static>> {
    if bpm == 0 {
        return Err(TheoryError::NonPositive { what: "tempo" });
    }

    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track
    let mut tempo_track: Track<'static> = Vec::new();
    let tempo_microseconds = 60_000_000 / bpm as u32;
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    tempo_track.push(end_of_track());
    smf.tracks.push(tempo_track);

    // Track 1: chords
    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Chords")),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel: u4::new(CHANNEL),
            message: MidiMessage::ProgramChange {
                program: u7::new(PROGRAM),
            },
        },
    });

    for chord in progression.iter().flatten() {
        push_chord(&mut track, chord);
    }

    track.push(end_of_track());
    smf.tracks.push(track);

    tracing::debug!(
        chords = progression.iter().map(Vec::len).sum::<usize>(),
        bpm,
        "built SMF"
    );
    Ok(smf)
}

/// Append one chord: every note on at once, every note off two beats later.
fn push_chord(track: &mut Track<'static>, chord: &Chord) {
    let notes = chord.midi_notes();
    for &key in &notes {
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel: u4::new(CHANNEL),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(CHORD_VELOCITY),
                },
            },
        });
    }
    for (i, &key) in notes.iter().enumerate() {
        // The first note-off carries the chord's whole duration.
        let delta = if i == 0 { TICKS_PER_CHORD } else { 0 };
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(CHANNEL),
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
        });
    }
}

fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{ChordQuality, RomanNumeral};
    use crate::note::PitchClass;

    fn progression() -> Progression {
        let c = Chord::diatonic(PitchClass::C, ChordQuality::Major, RomanNumeral::I);
        let am = Chord::diatonic(PitchClass::A, ChordQuality::Minor, RomanNumeral::MinorVI);
        vec![vec![c, am], vec![c]]
    }

    fn note_ons(track: &Track<'_>) -> Vec<u8> {
        track
            .iter()
            .filter_map(|ev| match ev.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, .. },
                    ..
                } => Some(key.as_int()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_progression_to_smf_basic() {
        let smf = progression_to_smf(&progression(), 120).unwrap();
        // 1 tempo track + 1 chord track
        assert_eq!(smf.tracks.len(), 2);
        assert_eq!(smf.header.format, Format::Parallel);
        assert!(matches!(
            smf.tracks[0][0].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(t)) if t.as_int() == 500_000
        ));
        assert_eq!(
            note_ons(&smf.tracks[1]),
            vec![48, 52, 55, 60, 57, 60, 64, 69, 48, 52, 55, 60]
        );
    }

    #[test]
    fn test_chords_last_two_beats() {
        let smf = progression_to_smf(&progression(), 90).unwrap();
        let total: u32 = smf.tracks[1].iter().map(|ev| ev.delta.as_int()).sum();
        assert_eq!(total, 3 * 2 * TICKS_PER_QUARTER as u32);
    }

    #[test]
    fn test_bytes_parse_back() {
        let bytes = midi_bytes(&progression(), 100).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 2);
        assert_eq!(note_ons(&smf.tracks[1]).len(), 12);
    }

    #[test]
    fn test_zero_tempo_rejected() {
        assert!(matches!(
            progression_to_smf(&progression(), 0),
            Err(TheoryError::NonPositive { what: "tempo" })
        ));
    }
}
