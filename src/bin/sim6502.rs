//! sim6502 - assemble and run a 6502 source file from the terminal

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info, warn};
use sim6502::{Event, EventKind, ExecutionState, Simulator, SimulatorConfig};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::Write;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Assembly source file
    file: PathBuf,

    /// Address to assemble at and start from (hex with $ or 0x, or decimal)
    #[arg(short, long, default_value = "$0600", value_parser = parse_address)]
    origin: u16,

    /// Instructions executed per batch
    #[arg(short, long, default_value_t = sim6502::config::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Stop after this many batches
    #[arg(short, long)]
    max_batches: Option<usize>,

    /// Print a hex dump of the program after running
    #[arg(long)]
    hexdump: bool,

    /// Print a disassembly of the program instead of running it
    #[arg(long)]
    disassemble: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_address(text: &str) -> Result<u16, String> {
    let parsed = if let Some(hex) = text.strip_prefix('$').or_else(|| text.strip_prefix("0x")) {
        u16::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let config = SimulatorConfig::default()
        .with_origin(args.origin)
        .with_batch_size(args.batch_size)
        .with_max_batches(args.max_batches);
    let mut sim = Simulator::new(config);
    install_listeners(&mut sim);

    info!("Assembling {}", args.file.display());
    sim.assemble(&source).context("Assembly failed")?;

    if args.disassemble {
        sim.program_disassembly();
        return Ok(());
    }

    let state = sim.run().context("Simulator error")?;
    std::io::stdout().flush()?;
    println!();
    info!("{}", sim.cpu().snapshot());

    if args.hexdump {
        sim.program_hexdump();
    }

    if state != ExecutionState::Completed {
        bail!("Program did not complete: {}", state);
    }
    Ok(())
}

/// Routes program output to stdout and everything else to the log.
fn install_listeners(sim: &mut Simulator) {
    sim.subscribe(EventKind::PseudoOp, |event| {
        if let Event::PseudoOp { output, .. } = event {
            match output {
                Some(text) => print!("{}", text),
                None => warn!("program asked for input; none is available"),
            }
        }
    });

    for kind in [
        EventKind::SimulatorInfo,
        EventKind::AssembleInfo,
        EventKind::LabelsInfo,
        EventKind::Stop,
    ] {
        sim.subscribe(kind, |event| info!("{}", event));
    }

    for kind in [
        EventKind::SimulatorFailure,
        EventKind::AssembleFailure,
        EventKind::LabelsFailure,
    ] {
        sim.subscribe(kind, |event| error!("{}", event));
    }

    sim.subscribe(EventKind::Hexdump, |event| {
        if let Event::Hexdump(text) = event {
            print!("{}", text);
        }
    });
    sim.subscribe(EventKind::Disassembly, |event| {
        if let Event::Disassembly(text) = event {
            print!("{}", text);
        }
    });
}
