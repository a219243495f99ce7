// VerseForge progression generator, CLI entry point.
//
// Builds a chord pool for a key, generates a progression, and prints it in
// the clipboard text format (or JSON). Optionally writes a MIDI file and
// plays a timed preview through the console backend.
//
// Usage:
//   cargo run -p verseforge_theory --bin generate -- [--key C] [--mode major]
//     [--lines 4] [--chords 4] [--line-types all,country-standard]
//     [--borrowed] [--seed N] [--tempo BPM] [--config cfg.json]
//     [--midi out.mid] [--json] [--play]
//
// Line types: major-only, minor-only, major-borrowed, all, country-standard
// Logging: RUST_LOG overrides the default `verseforge_theory=info`.
//
// Exit status: 0 on success, 2 for configuration errors (counts or tempo
// that are not positive, a line type that filters every chord away), 1 for
// anything else, including flag values that fail to parse.

use serde::Serialize;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verseforge_prng::SongRng;
use verseforge_theory::error::{Result, TheoryError};
use verseforge_theory::export::format_progression_text;
use verseforge_theory::midi::write_midi;
use verseforge_theory::playback::{ConsoleBackend, PlaybackService};
use verseforge_theory::{
    GeneratorConfig, Key, LineType, Progression, ProgressionGenerator, build_chord_pool,
};

#[derive(Serialize)]
struct JsonOutput<'a> {
    key: String,
    mode: String,
    seed: u64,
    progression: &'a Progression,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("verseforge_theory=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(if e.is_configuration_error() { 2 } else { 1 });
    }
}

fn run(args: &[String]) -> Result<()> {
    let key_name: String = parse_flag(args, "--key")?.unwrap_or_else(|| "C".to_string());
    let mode_name: String = parse_flag(args, "--mode")?.unwrap_or_else(|| "major".to_string());
    let num_lines = parse_count(args, "--lines", "num_lines")?.unwrap_or(4);
    let chords_per_line = parse_count(args, "--chords", "chords_per_line")?.unwrap_or(4);
    let include_borrowed = has_flag(args, "--borrowed");
    let seed: Option<u64> = parse_flag(args, "--seed")?;
    let config_path: Option<String> = parse_flag(args, "--config")?;
    let midi_path: Option<String> = parse_flag(args, "--midi")?;

    let line_types = match parse_flag::<String>(args, "--line-types")? {
        Some(list) => list
            .split(',')
            .map(str::parse::<LineType>)
            .collect::<Result<Vec<LineType>>>()?,
        None => Vec::new(),
    };

    let mut config = match &config_path {
        Some(path) => GeneratorConfig::load(Path::new(path))?,
        None => GeneratorConfig::default(),
    };
    if let Some(tempo) = parse_flag(args, "--tempo")? {
        config.tempo_bpm = tempo;
    }
    if config.tempo_bpm == 0 {
        return Err(TheoryError::NonPositive { what: "tempo" });
    }

    let key = Key::parse(&key_name, &mode_name)?;
    let seed = seed.unwrap_or_else(|| SongRng::from_time().next_u64());
    let mut rng = SongRng::new(seed);
    tracing::info!(%key, seed, num_lines, chords_per_line, "generating progression");

    let pool = build_chord_pool(key.tonic, key.mode, include_borrowed);
    let generator = ProgressionGenerator::from_config(&config)?;
    let progression = generator.generate(
        &pool,
        num_lines,
        chords_per_line,
        &line_types,
        key.mode,
        &mut rng,
    )?;

    if has_flag(args, "--json") {
        let out = JsonOutput {
            key: key.tonic.to_string(),
            mode: key.mode.to_string(),
            seed,
            progression: &progression,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Key: {}  (seed {})", key, seed);
        println!();
        print!("{}", format_progression_text(&progression));
    }

    if let Some(path) = &midi_path {
        write_midi(&progression, config.tempo_bpm, Path::new(path))?;
    }

    if has_flag(args, "--play") {
        let mut player = PlaybackService::new(ConsoleBackend);
        player.play(&progression, config.tempo_bpm, |line, chord| {
            tracing::debug!(line = line + 1, chord = chord + 1, "now playing");
        })?;
        player.dispose()?;
    }

    Ok(())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Value following `flag`, parsed. Absent flag is `Ok(None)`; a missing or
/// unparsable value is an error.
fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    let value = args.get(i + 1).map(String::as_str).unwrap_or_default();
    let invalid = || TheoryError::InvalidArgument {
        flag: flag.to_string(),
        value: value.to_string(),
    };
    if value.is_empty() {
        return Err(invalid());
    }
    value.parse().map(Some).map_err(|_| invalid())
}

/// A line or chord count. Anything that is not a positive integer is a
/// configuration error.
fn parse_count(args: &[String], flag: &str, what: &'static str) -> Result<Option<usize>> {
    match parse_flag::<i64>(args, flag) {
        Ok(Some(n)) if n > 0 => Ok(Some(n as usize)),
        Ok(None) => Ok(None),
        _ => Err(TheoryError::NonPositive { what }),
    }
}
