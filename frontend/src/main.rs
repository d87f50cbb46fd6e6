use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

mod script;
mod trace;

use script::Script;

/// Replay a register/strobe script against an 8255 PPI and print the trace.
#[derive(Parser, Debug)]
#[command(name = "i8255-trace", version)]
struct Args {
    /// TOML script with a `[[step]]` array
    script: PathBuf,

    /// Print the full device state after every step
    #[arg(long)]
    state: bool,

    /// Raise log verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let script = match Script::load(&args.script) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("{}: {e}", args.script.display());
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Loaded {} steps from {}",
        script.steps.len(),
        args.script.display()
    );

    let report = trace::run(&script, args.state);
    for line in &report.lines {
        println!("{line}");
    }

    if report.failures > 0 {
        eprintln!("{} read expectation(s) failed", report.failures);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
