//! SectorSim Headless Harness
//!
//! Generates new-game worlds and fast-forwards snapshots without a renderer.
//!
//! Usage:
//!   sectorsim-headless generate --seed 7 --out world.json
//!   sectorsim-headless run --snapshot world.json --target-time 3600 --delta 0.5 --out later.json
//!   sectorsim-headless inspect --snapshot later.json
//!   sectorsim-headless worker < init.json
//!
//! Set `RUST_LOG=info` (or `debug`) to see engine logs on stderr.

use std::collections::BTreeMap;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sectorsim_core::generation::generate_world;
use sectorsim_core::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless harness for SectorSim", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new-game world and write its snapshot
    Generate {
        /// World generation seed
        #[arg(long)]
        seed: u64,

        /// Output snapshot path
        #[arg(long)]
        out: PathBuf,

        /// World generation settings (JSON, partial documents allowed)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Indent the written JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Fast-forward a snapshot to a target time
    Run {
        /// Snapshot to start from
        #[arg(long)]
        snapshot: PathBuf,

        /// Simulated time to reach (seconds)
        #[arg(long)]
        target_time: f64,

        /// Tick length (seconds)
        #[arg(long, default_value_t = 1.0)]
        delta: f64,

        /// Simulation settings replacing the snapshot's own
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to write the final snapshot (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a summary of a snapshot
    Inspect {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Read one init message from stdin and answer with JSON lines on stdout
    Worker,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let outcome = match args.command {
        Command::Generate {
            seed,
            out,
            config,
            pretty,
        } => generate(seed, &out, config.as_deref(), pretty),
        Command::Run {
            snapshot,
            target_time,
            delta,
            config,
            out,
        } => run(&snapshot, target_time, delta, config.as_deref(), out.as_deref()),
        Command::Inspect { snapshot } => inspect(&snapshot),
        Command::Worker => worker(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// ── Subcommands ─────────────────────────────────────────────────────────

fn generate(seed: u64, out: &Path, config: Option<&Path>, pretty: bool) -> Result<()> {
    let config = match config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read world config at {}", path.display()))?;
            WorldGenConfig::from_json(&json)
                .with_context(|| format!("Failed to parse world config at {}", path.display()))?
        }
        None => WorldGenConfig::default(),
    };

    let sim = generate_world(&config, seed).with_context(|| format!("World generation failed for seed {seed}"))?;
    let snapshot = sim.serialize();
    let json = if pretty {
        snapshot.to_json_pretty()?
    } else {
        snapshot.to_json()?
    };
    std::fs::write(out, json).with_context(|| format!("Failed to write snapshot to {}", out.display()))?;

    println!("generated {} entities (seed {seed}) -> {}", snapshot.entities.len(), out.display());
    Ok(())
}

fn run(snapshot: &Path, target_time: f64, delta: f64, config: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let start = Snapshot::load(snapshot).with_context(|| format!("Failed to load snapshot at {}", snapshot.display()))?;
    let config = config
        .map(|path| SimConfig::from_path(path).with_context(|| format!("Failed to load config at {}", path.display())))
        .transpose()?;

    let mut run = fast_forward(start, target_time, delta, config).context("Failed to start fast-forward")?;
    for progress in run.by_ref() {
        let progress = progress.context("Tick failed")?;
        log::info!("t={} after {} ticks", progress.time, progress.ticks);
    }
    let end = run.into_snapshot()?;

    match out {
        Some(path) => end
            .save(path)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?,
        None => println!("{}", end.to_json()?),
    }
    Ok(())
}

fn inspect(snapshot: &Path) -> Result<()> {
    let snapshot = Snapshot::load(snapshot).with_context(|| format!("Failed to load snapshot at {}", snapshot.display()))?;
    snapshot.validate().context("Snapshot is invalid")?;

    let mut archetypes: BTreeMap<String, usize> = BTreeMap::new();
    for record in &snapshot.entities {
        let name = record
            .components
            .archetype
            .map(|archetype| archetype.to_string())
            .unwrap_or_else(|| "(none)".to_string());
        *archetypes.entry(name).or_default() += 1;
    }

    println!("=== Snapshot v{} ===", snapshot.version);
    println!("time      {}", snapshot.time);
    println!("nextId    {}", snapshot.next_id);
    println!("entities  {}", snapshot.entities.len());
    for (archetype, count) in archetypes {
        println!("  {archetype:<12} {count}");
    }
    Ok(())
}

fn worker() -> Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input).context("Failed to read init message from stdin")?;
    let message: HostMessage = serde_json::from_str(&input).context("Failed to parse init message")?;

    let worker = Worker::spawn();
    worker.send(message)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    loop {
        let reply = worker.recv()?;
        serde_json::to_writer(&mut out, &reply)?;
        writeln!(out)?;
        out.flush()?;
        match reply {
            WorkerMessage::Update { .. } => continue,
            WorkerMessage::Completed { .. } => return Ok(()),
            WorkerMessage::Failed { error } => bail!("run failed: {error}"),
        }
    }
}
