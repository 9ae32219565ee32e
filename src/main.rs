use partsim::{Result, Sequence};
use std::error::Error;
use std::path::PathBuf;

/// Runs a test sequence against a circuit and prints the reported connectors of every clock cycle.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Sequence script.
    ///
    /// Its `Load` field names the circuit description relative to the script,
    /// or "." if the script holds the circuit itself.
    script: PathBuf,
}

/// Connector dumps after every scan when > 0.
const VERBOSITY: u8 = 0;

fn run(args: &Args) -> Result<()> {
    let mut sequence = Sequence::load(&args.script)?;
    let report = sequence.run(VERBOSITY)?;

    colour::cyan_ln!("{}", report.header_line());
    for line in report.lines() {
        println!("{}", line);
    }
    Ok(())
}

fn main() {
    clilog::init_stderr_color_debug();
    let args = <Args as clap::Parser>::parse();
    clilog::info!("sequence mode start, args:\n{:#?}", args);

    if let Err(err) = run(&args) {
        colour::e_red_ln!("error: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            colour::e_red_ln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}
