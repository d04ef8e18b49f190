// Orbitone generator: CLI entry point.
//
// Builds a piece from a composition config (a built-in preset or a JSON
// file) and writes it as a format-0 MIDI file.
//
// Usage:
//   cargo run -p orbitone_music -- [output.mid] [--preset NAME] [--config FILE]
//     [--tempo BPM] [--dump-config]
//
// Presets: complex1, edge_rock. Set RUST_LOG=debug for per-pass detail.

use clap::Parser;
use orbitone_music::compose::compose;
use orbitone_music::config::{CompositionConfig, Preset};
use orbitone_music::midi::write_midi;
use orbitone_music::note::pitch_name;
use std::path::PathBuf;

/// Generate chord material from complex-dynamics orbits
#[derive(Parser)]
#[command(name = "generate")]
#[command(about = "Generate a MIDI piece from complex-dynamics orbits")]
struct Args {
    /// Output MIDI file
    #[arg(default_value = "output.mid")]
    output: PathBuf,

    /// Built-in composition to start from
    #[arg(long, default_value = "complex1")]
    preset: Preset,

    /// JSON composition config (replaces the preset)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the config's tempo
    #[arg(long)]
    tempo: Option<u32>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> orbitone_music::Result<()> {
    let mut config = match &args.config {
        Some(path) => CompositionConfig::load(path)?,
        None => args.preset.config(),
    };
    if let Some(tempo) = args.tempo {
        config.tempo_bpm = tempo;
    }
    config.validate()?;

    if args.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    println!("=== Orbitone Generator ===");
    println!("Output: {}", args.output.display());
    match &args.config {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Preset: {}", args.preset),
    }
    println!("Tempo: {} BPM", config.tempo_bpm);
    println!("Root: {}", pitch_name(config.scale_root));
    println!("Blocks: {}", config.blocks.len());
    println!();

    println!("[1/2] Sampling {} passes...", config.pass_count());
    let composition = compose(&config)?;
    let stats = composition.stats;
    println!(
        "  {} trajectories -> {} chords ({} notes)",
        stats.trajectories, stats.chords, stats.notes
    );
    if stats.skipped > 0 {
        println!("  {} escaped orbits left no samples", stats.skipped);
    }

    println!("[2/2] Writing MIDI...");
    let part = composition.part;
    let measures = part.end_tick().div_ceil(part.ticks_per_measure.max(1));
    write_midi(std::slice::from_ref(&part), config.tempo_bpm, &args.output)?;
    println!("  Wrote {} ({} measures)", args.output.display(), measures);

    Ok(())
}
