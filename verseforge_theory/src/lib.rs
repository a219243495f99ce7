// VerseForge music theory and chord-progression generator.
//
// The engine behind the songwriting app's "generate progression" button.
// Given a key, a mode, whether to borrow from the parallel mode, and a
// per-line restriction, it produces one line of chords per lyric line,
// drawn by a first-order Markov walk over roman-numeral transition weights.
//
// Architecture:
// - note.rs: Pitch classes, canonical note names, transposition
// - mode.rs: Major/minor keys, scale generation, scale-degree names
// - chord.rs: Chord qualities, roman-numeral labels, the `Chord` value
// - pool.rs: Diatonic + borrowed chord pools per key
// - function.rs: Tonic / predominant / dominant classification
// - markov.rs: Transition-weight tables and roulette-wheel draws
// - config.rs: `GeneratorConfig`, loaded from JSON
// - select.rs: One weighted step, with repetition and resolution policies
// - progression.rs: Line types and line/progression assembly
// - export.rs: Clipboard text format
// - midi.rs: Standard MIDI File output
// - playback.rs: Backend-agnostic, caller-owned playback service
// - fretboard.rs: Standard-tuning note lookup and power-chord shapes
// - positions.rs: Guitar voicings per chord, from a JSON table
// - key_detect.rs: Candidate keys for a single chord
// - error.rs: `TheoryError` and the crate `Result`
//
// All randomness enters through `verseforge_prng::UniformSource`, so a
// seeded run or a replayed draw list reproduces a progression exactly.

pub mod chord;
pub mod config;
pub mod error;
pub mod export;
pub mod fretboard;
pub mod function;
pub mod key_detect;
pub mod markov;
pub mod midi;
pub mod mode;
pub mod note;
pub mod playback;
pub mod pool;
pub mod positions;
pub mod progression;
pub mod select;

pub use chord::{Chord, ChordQuality, RomanNumeral};
pub use config::GeneratorConfig;
pub use error::{Result, TheoryError};
pub use function::HarmonicFunction;
pub use key_detect::{KeyContext, best_key_match, detect_possible_keys};
pub use mode::{Key, KeyMode, ScaleType};
pub use note::PitchClass;
pub use pool::{ChordPool, build_chord_pool};
pub use positions::{ChordPosition, get_chord_positions};
pub use progression::{LineType, Progression, ProgressionGenerator, generate_progression};
