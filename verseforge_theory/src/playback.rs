// Progression playback.
//
// `PlaybackService` walks a progression chord by chord at a given tempo and
// hands each chord's notes to a `PlaybackBackend`, the seam where a real
// synthesizer plugs in. The service is owned by its caller: construct it,
// `play`/`stop` as often as needed, then `dispose` it. There is no shared
// global player.
//
// Timing: every chord holds for two beats, `2 * 60 / bpm` seconds, and is
// voiced in octave 4 (`C4 E4 G4`). A stop request is honoured before each
// chord, so at most one chord keeps sounding after `StopHandle::stop`, and
// the backend is told to release it. A request that lands before `play`
// starts stops that `play` before its first chord; each `play` consumes the
// pending request when it returns.
//
// `schedule` exposes the same timeline without sounding anything, for
// callers that drive their own clock (UI highlighting, offline render).

use crate::chord::Chord;
use crate::config::DEFAULT_TEMPO_BPM;
use crate::error::{Result, TheoryError};
use crate::progression::Progression;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Octave the playback voicing is spelled in.
pub const PLAYBACK_OCTAVE: i8 = 4;

/// Beats each chord is held for.
pub const BEATS_PER_CHORD: u32 = 2;

/// The synthesizer side of playback.
pub trait PlaybackBackend {
    /// Prepare the audio output. Called before every `play`.
    fn start(&mut self) -> Result<()>;
    /// Sound `notes` together for `duration`. Must not block for it.
    fn trigger(&mut self, notes: &[String], duration: Duration);
    /// Block for `duration` while the triggered chord rings.
    fn wait(&mut self, duration: Duration);
    /// Silence every sounding note.
    fn release_all(&mut self);
    /// Free the audio output. No other call follows.
    fn dispose(&mut self);
}

/// Backend that sounds nothing: it logs each chord and sleeps the thread
/// for its duration. Used by the CLI's `--play` preview.
#[derive(Debug, Default)]
pub struct ConsoleBackend;

impl PlaybackBackend for ConsoleBackend {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn trigger(&mut self, notes: &[String], duration: Duration) {
        tracing::info!(notes = %notes.join(" "), ?duration, "chord");
    }

    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn release_all(&mut self) {}

    fn dispose(&mut self) {}
}

/// How a call to `play` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Finished,
    Stopped,
}

/// One chord on the playback timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledChord {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based chord index within the line.
    pub index: usize,
    pub start: Duration,
    pub duration: Duration,
    pub notes: Vec<String>,
}

/// How long one chord lasts at `bpm`.
pub fn chord_duration(bpm: u16) -> Result<Duration> {
    if bpm == 0 {
        return Err(TheoryError::NonPositive { what: "tempo" });
    }
    let micros = u64::from(BEATS_PER_CHORD) * 60_000_000 / u64::from(bpm);
    Ok(Duration::from_micros(micros))
}

/// Note names a chord is played with.
pub fn playback_notes(chord: &Chord) -> Vec<String> {
    chord.note_names(PLAYBACK_OCTAVE)
}

/// The full playback timeline, chords laid end to end in line order.
pub fn schedule(progression: &Progression, bpm: u16) -> Result<Vec<ScheduledChord>> {
    let duration = chord_duration(bpm)?;
    let mut start = Duration::ZERO;
    let mut timeline = Vec::new();
    for (line, chords) in progression.iter().enumerate() {
        for (index, chord) in chords.iter().enumerate() {
            timeline.push(ScheduledChord {
                line,
                index,
                start,
                duration,
                notes: playback_notes(chord),
            });
            start += duration;
        }
    }
    Ok(timeline)
}

/// Cloneable handle that stops playback from another thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop_requested: Arc<AtomicBool>,
    playing: Arc<AtomicBool>,
}

impl StopHandle {
    /// Ask the running (or next) `play` to stop before its next chord.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Plays progressions through a backend. See the module comment for the
/// lifecycle.
#[derive(Debug)]
pub struct PlaybackService<B: PlaybackBackend> {
    backend: B,
    stop_requested: Arc<AtomicBool>,
    playing: Arc<AtomicBool>,
    disposed: bool,
}

impl<B: PlaybackBackend> PlaybackService<B> {
    pub fn new(backend: B) -> Self {
        PlaybackService {
            backend,
            stop_requested: Arc::new(AtomicBool::new(false)),
            playing: Arc::new(AtomicBool::new(false)),
            disposed: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop_requested: Arc::clone(&self.stop_requested),
            playing: Arc::clone(&self.playing),
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            Err(TheoryError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Play `progression` at `bpm`, calling `on_progress(line, chord)` just
    /// before each chord sounds. Blocks until the progression finishes or a
    /// stop is requested.
    pub fn play(
        &mut self,
        progression: &Progression,
        bpm: u16,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<PlaybackStatus> {
        self.ensure_live()?;
        let duration = chord_duration(bpm)?;
        self.backend.start()?;

        self.playing.store(true, Ordering::SeqCst);
        tracing::debug!(lines = progression.len(), bpm, "playback started");

        let mut status = PlaybackStatus::Finished;
        'lines: for (line, chords) in progression.iter().enumerate() {
            for (index, chord) in chords.iter().enumerate() {
                if self.stop_requested.load(Ordering::SeqCst) {
                    status = PlaybackStatus::Stopped;
                    break 'lines;
                }
                on_progress(line, index);
                self.backend.trigger(&playback_notes(chord), duration);
                self.backend.wait(duration);
            }
        }

        if status == PlaybackStatus::Stopped {
            self.backend.release_all();
        }
        self.stop_requested.store(false, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        tracing::debug!(?status, "playback ended");
        Ok(status)
    }

    /// Play `C4 E4 G4` for two beats at the default tempo.
    pub fn test_sound(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.backend.start()?;
        let notes: Vec<String> = ["C4", "E4", "G4"].iter().map(|n| n.to_string()).collect();
        self.backend.trigger(&notes, chord_duration(DEFAULT_TEMPO_BPM)?);
        Ok(())
    }

    /// Silence the backend and drop any pending stop request. `play` holds
    /// `&mut self`, so cross-thread stops go through a `StopHandle`.
    pub fn stop(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.stop_requested.store(false, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        self.backend.release_all();
        Ok(())
    }

    /// Stop and free the backend. Every later call fails with `Disposed`.
    pub fn dispose(&mut self) -> Result<()> {
        self.stop()?;
        self.backend.dispose();
        self.disposed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{ChordQuality, RomanNumeral};
    use crate::note::PitchClass;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Start,
        Trigger(Vec<String>, Duration),
        Wait(Duration),
        ReleaseAll,
        Dispose,
    }

    /// Records every call; optionally requests a stop after N waits.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<Call>,
        stop_after: Option<(usize, StopHandle)>,
        waits: usize,
    }

    impl PlaybackBackend for RecordingBackend {
        fn start(&mut self) -> Result<()> {
            self.calls.push(Call::Start);
            Ok(())
        }

        fn trigger(&mut self, notes: &[String], duration: Duration) {
            self.calls.push(Call::Trigger(notes.to_vec(), duration));
        }

        fn wait(&mut self, duration: Duration) {
            self.calls.push(Call::Wait(duration));
            self.waits += 1;
            if let Some((n, handle)) = &self.stop_after {
                if self.waits == *n {
                    handle.stop();
                }
            }
        }

        fn release_all(&mut self) {
            self.calls.push(Call::ReleaseAll);
        }

        fn dispose(&mut self) {
            self.calls.push(Call::Dispose);
        }
    }

    fn progression() -> Progression {
        let c = Chord::diatonic(PitchClass::C, ChordQuality::Major, RomanNumeral::I);
        let am = Chord::diatonic(PitchClass::A, ChordQuality::Minor, RomanNumeral::MinorVI);
        let g = Chord::diatonic(PitchClass::G, ChordQuality::Major, RomanNumeral::V);
        vec![vec![c, am], vec![g, c]]
    }

    fn notes(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_chord_duration() {
        assert_eq!(chord_duration(120).unwrap(), Duration::from_secs(1));
        assert_eq!(chord_duration(60).unwrap(), Duration::from_secs(2));
        assert_eq!(chord_duration(100).unwrap(), Duration::from_millis(1200));
        assert!(matches!(
            chord_duration(0),
            Err(TheoryError::NonPositive { what: "tempo" })
        ));
    }

    #[test]
    fn test_schedule_lays_chords_end_to_end() {
        let timeline = schedule(&progression(), 120).unwrap();
        assert_eq!(timeline.len(), 4);
        assert_eq!((timeline[2].line, timeline[2].index), (1, 0));
        assert_eq!(timeline[3].start, Duration::from_secs(3));
        assert_eq!(timeline[1].notes, notes(&["A4", "C4", "E4"]));
    }

    #[test]
    fn test_play_visits_every_chord() {
        let mut service = PlaybackService::new(RecordingBackend::default());
        let mut visited = Vec::new();
        let status = service
            .play(&progression(), 120, |line, chord| visited.push((line, chord)))
            .unwrap();
        assert_eq!(status, PlaybackStatus::Finished);
        assert_eq!(visited, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert!(!service.is_playing());

        let calls = &service.backend().calls;
        assert_eq!(calls[0], Call::Start);
        assert_eq!(
            calls[1],
            Call::Trigger(notes(&["C4", "E4", "G4"]), Duration::from_secs(1))
        );
        assert_eq!(calls[2], Call::Wait(Duration::from_secs(1)));
        assert_eq!(calls.len(), 1 + 2 * 4);
    }

    #[test]
    fn test_stop_handle_halts_before_next_chord() {
        let mut service = PlaybackService::new(RecordingBackend::default());
        let handle = service.stop_handle();
        service.backend.stop_after = Some((2, handle));
        let mut visited = 0;
        let status = service
            .play(&progression(), 240, |_, _| visited += 1)
            .unwrap();
        assert_eq!(status, PlaybackStatus::Stopped);
        assert_eq!(visited, 2);
        assert_eq!(service.backend().calls.last(), Some(&Call::ReleaseAll));
    }

    #[test]
    fn test_stop_before_play_is_honoured_once() {
        let mut service = PlaybackService::new(RecordingBackend::default());
        service.stop_handle().stop();
        let mut visited = 0;
        let status = service
            .play(&progression(), 120, |_, _| visited += 1)
            .unwrap();
        assert_eq!(status, PlaybackStatus::Stopped);
        assert_eq!(visited, 0);
        assert_eq!(
            service.backend().calls,
            vec![Call::Start, Call::ReleaseAll]
        );

        let status = service.play(&progression(), 120, |_, _| {}).unwrap();
        assert_eq!(status, PlaybackStatus::Finished);
    }

    #[test]
    fn test_replay_after_stop() {
        let mut service = PlaybackService::new(RecordingBackend::default());
        service.stop().unwrap();
        let status = service.play(&progression(), 120, |_, _| {}).unwrap();
        assert_eq!(status, PlaybackStatus::Finished);
    }

    #[test]
    fn test_zero_tempo_rejected_without_touching_backend() {
        let mut service = PlaybackService::new(RecordingBackend::default());
        let err = service.play(&progression(), 0, |_, _| {}).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(service.backend().calls.is_empty());
    }

    #[test]
    fn test_dispose_then_use_fails() {
        let mut service = PlaybackService::new(RecordingBackend::default());
        service.dispose().unwrap();
        assert!(service.is_disposed());
        assert_eq!(
            service.backend().calls,
            vec![Call::ReleaseAll, Call::Dispose]
        );
        assert!(matches!(
            service.play(&progression(), 120, |_, _| {}),
            Err(TheoryError::Disposed)
        ));
        assert!(matches!(service.test_sound(), Err(TheoryError::Disposed)));
        assert!(matches!(service.dispose(), Err(TheoryError::Disposed)));
    }

    #[test]
    fn test_test_sound() {
        let mut service = PlaybackService::new(RecordingBackend::default());
        service.test_sound().unwrap();
        assert_eq!(
            service.backend().calls[1],
            Call::Trigger(notes(&["C4", "E4", "G4"]), Duration::from_secs(1))
        );
    }
}
