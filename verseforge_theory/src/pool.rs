// Chord-pool construction.
//
// A pool is the ordered list of chords the generator may choose from for a
// key: the seven diatonic triads, optionally followed by five chords
// borrowed from the parallel mode.
//
// The borrowed set is a fixed, hand-picked list per mode, not every chord
// the parallel key could lend. It covers the idiomatic country/pop color
// chords (major key: iv, ♭VII, ♭VI, ♭III, i; minor key: IV, V, VI, I, ii).
// Overlap with the diatonic set by `(root, quality)` is allowed; the line
// de-dup in select.rs resolves it by first-seen.
//
// Pool order is stable and significant: the selector walks candidates in
// pool order, so seeded runs reproduce exactly.

use crate::chord::{Chord, ChordQuality, RomanNumeral};
use crate::error::Result;
use crate::mode::{Key, KeyMode};
use crate::note::PitchClass;

/// Ordered chord pool for one key.
pub type ChordPool = Vec<Chord>;

/// Number of borrowed chords appended when requested.
pub const BORROWED_COUNT: usize = 5;

/// Per-degree quality and label for each key mode.
pub(crate) fn diatonic_table(mode: KeyMode) -> [(ChordQuality, RomanNumeral); 7] {
    use ChordQuality::*;
    match mode {
        KeyMode::Major => [
            (Major, RomanNumeral::I),
            (Minor, RomanNumeral::MinorII),
            (Minor, RomanNumeral::MinorIII),
            (Major, RomanNumeral::IV),
            (Major, RomanNumeral::V),
            (Minor, RomanNumeral::MinorVI),
            (Diminished, RomanNumeral::DimVII),
        ],
        KeyMode::Minor => [
            (Minor, RomanNumeral::MinorI),
            (Diminished, RomanNumeral::DimII),
            (Major, RomanNumeral::FlatIII),
            (Minor, RomanNumeral::MinorIV),
            (Minor, RomanNumeral::MinorV),
            (Major, RomanNumeral::FlatVI),
            (Major, RomanNumeral::FlatVII),
        ],
    }
}

/// Borrowed chords as (degree in the parallel scale, quality, label).
fn borrowed_table(mode: KeyMode) -> [(usize, ChordQuality, RomanNumeral); BORROWED_COUNT] {
    use ChordQuality::*;
    match mode {
        KeyMode::Major => [
            (3, Minor, RomanNumeral::MinorIV),
            (6, Major, RomanNumeral::FlatVII),
            (5, Major, RomanNumeral::FlatVI),
            (2, Major, RomanNumeral::FlatIII),
            (0, Minor, RomanNumeral::MinorI),
        ],
        // VI keeps the minor quality it has always had in the app's pool.
        KeyMode::Minor => [
            (3, Major, RomanNumeral::IV),
            (4, Major, RomanNumeral::V),
            (5, Minor, RomanNumeral::VI),
            (0, Major, RomanNumeral::I),
            (1, Minor, RomanNumeral::MinorII),
        ],
    }
}

/// The seven diatonic triads of `key`, tonic first.
pub fn diatonic_chords(key: Key) -> Vec<Chord> {
    diatonic_table(key.mode)
        .iter()
        .enumerate()
        .map(|(degree, &(quality, roman))| Chord::diatonic(key.degree(degree), quality, roman))
        .collect()
}

/// The fixed borrowed set for `key`, every chord tagged with the parallel
/// mode it came from.
pub fn borrowed_chords(key: Key) -> Vec<Chord> {
    let parallel = key.parallel();
    borrowed_table(key.mode)
        .iter()
        .map(|&(degree, quality, roman)| {
            Chord::borrowed(parallel.degree(degree), quality, roman, parallel.mode)
        })
        .collect()
}

/// Build the pool for `root` in `mode`: 7 diatonic chords, plus 5
/// borrowed ones when `include_borrowed` is set. Never fails.
pub fn build_chord_pool(root: PitchClass, mode: KeyMode, include_borrowed: bool) -> ChordPool {
    let key = Key::new(root, mode);
    let mut pool = diatonic_chords(key);
    if include_borrowed {
        pool.extend(borrowed_chords(key));
    }
    tracing::debug!(
        key = %root,
        %mode,
        include_borrowed,
        size = pool.len(),
        "built chord pool"
    );
    pool
}

/// String-keyed variant for UI callers; rejects non-canonical roots.
pub fn build_chord_pool_named(root: &str, mode: KeyMode, include_borrowed: bool) -> Result<ChordPool> {
    Ok(build_chord_pool(PitchClass::parse(root)?, mode, include_borrowed))
}
