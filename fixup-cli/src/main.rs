//! fixuphtml CLI
//!
//! Reads HTML produced by a markup converter, normalizes a handful of
//! structural details, and writes everything else through unchanged.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fixup_common::{Diagnostic, Reporter};
use fixup_rewrite::rewrite;
use owo_colors::OwoColorize;

#[derive(Parser)]
#[command(
    name = "fixuphtml",
    about = "Normalize converter-generated HTML, copying everything else through unchanged"
)]
struct Args {
    /// Input HTML file; standard input if omitted.
    input: Option<PathBuf>,

    /// Output file; standard output if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Prints diagnostics to stderr as `FILE:LINE: MESSAGE`, remembering
/// whether anything was reported so the exit status can reflect it.
struct StderrReporter {
    label: String,
    reported: bool,
}

impl StderrReporter {
    fn new(input: Option<&PathBuf>) -> Self {
        let label = input.map_or_else(|| String::from("<stdin>"), |path| path.display().to_string());
        Self {
            label,
            reported: false,
        }
    }
}

impl Reporter for StderrReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.reported = true;
        match diagnostic.line {
            Some(line) => eprintln!("{}:{line}: {}", self.label.bold(), diagnostic.message),
            None => eprintln!("{}: {}", self.label.bold(), diagnostic.message),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut reporter = StderrReporter::new(args.input.as_ref());

    match run(&args, &mut reporter) {
        Ok(()) if !reporter.reported => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(error) => {
            reporter.report(Diagnostic::general(format!("{error:#}")));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, reporter: &mut StderrReporter) -> Result<()> {
    let stdin = io::stdin();
    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(stdin.lock()),
    };

    let stdout = io::stdout();
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(stdout.lock()),
    };

    let mut output = rewrite(input, output, reporter).context("error rewriting input")?;
    output.flush().context("error flushing output")?;
    Ok(())
}
