// Data-driven generator configuration.
//
// Every tunable the generator reads lives in `GeneratorConfig`, loadable
// from JSON so weight experiments need no recompile. Missing fields take
// their defaults, so a config file only has to name what it changes:
//
//     { "weight_table": "roman-matrix",
//       "weight_overrides": { "bVII": { "IV": 12 } } }
//
// See markov.rs for how the weight fields are resolved into a
// `TransitionWeights`, and select.rs for `resolution_boost`.

use crate::error::Result;
use crate::markov::{DEFAULT_FALLBACK_WEIGHT, WeightTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Final-slot multiplier for `I`, `i` and `V` candidates.
pub const DEFAULT_RESOLUTION_BOOST: u32 = 2;

/// Tempo used by playback and MIDI export when none is given.
pub const DEFAULT_TEMPO_BPM: u16 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base transition table.
    pub weight_table: WeightTable,
    /// Weight for transitions the roman matrix does not list.
    pub fallback_weight: u32,
    /// Multiplier applied on a line's last slot to candidates labelled
    /// `I`, `i` or `V`. 1 disables the bias.
    pub resolution_boost: u32,
    pub tempo_bpm: u16,
    /// `from label -> to label -> weight`, applied over the base table.
    pub weight_overrides: BTreeMap<String, BTreeMap<String, u32>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            weight_table: WeightTable::default(),
            fallback_weight: DEFAULT_FALLBACK_WEIGHT,
            resolution_boost: DEFAULT_RESOLUTION_BOOST,
            tempo_bpm: DEFAULT_TEMPO_BPM,
            weight_overrides: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
