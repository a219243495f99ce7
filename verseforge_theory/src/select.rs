// Weighted next-chord selection.
//
// One step of the generator: given the chord just placed, pick the next one
// from the line's candidate pool by roulette-wheel selection over the
// transition weights (markov.rs).
//
// Policies, applied in this order:
//
// 1. Repetition. Candidates are the filtered pool minus every chord already
//    used in the line, matched by `(root, quality)`. If that leaves nothing,
//    repeats from the filtered pool are allowed; if the filtered pool itself
//    is empty, repeats from the full, unfiltered pool are allowed. Selection
//    never gets stuck while any chord exists.
// 2. Resolution bias. On a line's final slot, candidates labelled `I`, `i`
//    or `V` have their weight multiplied by the resolution boost. This tilts
//    endings toward tonic/dominant without forbidding anything else.
// 3. Draw. One uniform draw per step, candidates walked in pool order.
//
// Line starts are not weighted: the first line opens on the pool's `I`/`i`
// when present; other lines draw uniformly from the Tonic-function chords,
// or from the whole pool if it has none.

use crate::chord::{Chord, ChordId, RomanNumeral};
use crate::error::{Result, TheoryError};
use crate::function::HarmonicFunction;
use crate::markov::{TransitionWeights, roulette_index};
use verseforge_prng::UniformSource;

/// Labels that receive the final-slot boost.
pub fn is_resolving(roman: RomanNumeral) -> bool {
    matches!(
        roman,
        RomanNumeral::I | RomanNumeral::MinorI | RomanNumeral::V
    )
}

/// Stateless step selector over a shared weight table.
#[derive(Debug, Clone, Copy)]
pub struct ChordSelector<'a> {
    weights: &'a TransitionWeights,
    resolution_boost: u32,
}

impl<'a> ChordSelector<'a> {
    pub fn new(weights: &'a TransitionWeights, resolution_boost: u32) -> Self {
        ChordSelector {
            weights,
            resolution_boost: resolution_boost.max(1),
        }
    }

    /// Weight of moving from `last` to `candidate`, boosted on the final slot.
    pub fn candidate_weight(&self, last: &Chord, candidate: &Chord, is_final: bool) -> u32 {
        let base = self.weights.weight(last.roman, candidate.roman);
        if is_final && is_resolving(candidate.roman) {
            base.saturating_mul(self.resolution_boost)
        } else {
            base
        }
    }

    /// Candidate set for one step under the repetition policy.
    ///
    /// `filtered` is the line's pool after line-type filtering; `full` is
    /// the unfiltered pool, consulted only when `filtered` is empty.
    pub fn candidates<'p>(
        filtered: &'p [Chord],
        full: &'p [Chord],
        used: &[ChordId],
    ) -> Result<Vec<&'p Chord>> {
        let unused: Vec<&Chord> = filtered
            .iter()
            .filter(|c| !used.contains(&c.id()))
            .collect();
        if !unused.is_empty() {
            return Ok(unused);
        }
        if !filtered.is_empty() {
            tracing::debug!(size = filtered.len(), "line pool exhausted, allowing repeats");
            return Ok(filtered.iter().collect());
        }
        if !full.is_empty() {
            tracing::warn!(size = full.len(), "filtered pool empty, falling back to full pool");
            return Ok(full.iter().collect());
        }
        Err(TheoryError::EmptyPool)
    }

    /// Pick the chord that follows `last`.
    pub fn next_chord(
        &self,
        last: &Chord,
        filtered: &[Chord],
        full: &[Chord],
        used: &[ChordId],
        is_final: bool,
        source: &mut impl UniformSource,
    ) -> Result<Chord> {
        let candidates = Self::candidates(filtered, full, used)?;
        let weights: Vec<u32> = candidates
            .iter()
            .map(|c| self.candidate_weight(last, c, is_final))
            .collect();
        tracing::trace!(
            from = %last.roman,
            candidates = ?candidates.iter().map(|c| c.roman.label()).collect::<Vec<_>>(),
            ?weights,
            is_final,
            "weighted candidates"
        );
        let idx = roulette_index(&weights, source).ok_or(TheoryError::EmptyPool)?;
        Ok(*candidates[idx])
    }

    /// Pick a line's opening chord.
    pub fn line_start(
        &self,
        filtered: &[Chord],
        first_line: bool,
        source: &mut impl UniformSource,
    ) -> Result<Chord> {
        if filtered.is_empty() {
            return Err(TheoryError::EmptyPool);
        }
        if first_line {
            if let Some(tonic) = filtered.iter().find(|c| c.roman.is_tonic_triad()) {
                return Ok(*tonic);
            }
        }
        let tonic_function: Vec<&Chord> = filtered
            .iter()
            .filter(|c| c.function() == HarmonicFunction::Tonic)
            .collect();
        let chord = if tonic_function.is_empty() {
            filtered[source.index(filtered.len())]
        } else {
            *tonic_function[source.index(tonic_function.len())]
        };
        Ok(chord)
    }
}
