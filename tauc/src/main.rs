use std::fs;
use std::process::ExitCode;

use clap::Parser;
use color_print::cformat;
use emu::hooks::{serial::Serial, trace::Trace};
use emu::Vm;
use tauc::util::display::{print_frames, print_listing};
use tauc::{compile, Error};

#[derive(Parser, Debug)]
#[clap(
    name = "tauc",
    version = "v1.0.0",
    about = "Compiler for the Tau language"
)]
struct Args {
    /// Source file
    input_file: String,

    /// Program arguments passed to `main`
    #[arg(allow_negative_numbers = true)]
    args: Vec<i64>,

    /// Print the instruction listing instead of running
    #[arg(long)]
    asm: bool,

    /// Write the instruction stream as YAML
    #[arg(short, long)]
    emit: Option<String>,

    /// Trace every executed instruction
    #[arg(long)]
    trace: bool,

    /// Step limit of the virtual machine
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let logger = tracing_subscriber::fmt::Subscriber::builder()
        .without_time()
        .with_writer(std::io::stderr);
    if args.verbose {
        logger.with_max_level(tracing::Level::DEBUG).init();
    } else {
        logger
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let source = match fs::read_to_string(&args.input_file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}", cformat!("<red,bold>error</>: {}: {}", args.input_file, err));
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &source) {
        Ok(Some(exit)) => {
            if args.verbose {
                println!("exit: {}", exit);
            }
            ExitCode::from(exit as u8)
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            report(&args.input_file, &source, &err);
            ExitCode::FAILURE
        }
    }
}

/// Compile, then emit, list or execute. Returns the exit value when executed.
fn run(args: &Args, source: &str) -> Result<Option<i64>, Error> {
    let compiled = compile(source)?;

    if let Some(path) = &args.emit {
        fs::write(path, serde_yaml::to_string(&compiled.code)?)?;
    }
    if args.asm {
        if args.verbose {
            print_frames(&compiled.program, compiled.table()?);
        }
        print_listing(&compiled.code);
        return Ok(None);
    }
    if args.emit.is_some() {
        return Ok(None);
    }

    let mut vm = Vm::new(compiled.code)?
        .tmax(args.tmax)
        .hook(Box::new(Serial::arg(false, None)?));
    if args.trace {
        vm = vm.hook(Box::new(Trace));
    }
    let outcome = vm.run(&args.args)?;
    tracing::debug!("halted after {} steps", outcome.steps);
    Ok(Some(outcome.exit))
}

/// Print an error with the offending source line underlined.
fn report(file: &str, source: &str, err: &Error) {
    eprintln!("{}", cformat!("<red,bold>error</>: {}", err));
    let Some(span) = err.span() else {
        return;
    };
    let line_num = span.start.line;
    let line = source.lines().nth(line_num.saturating_sub(1)).unwrap_or("");
    let width = if span.end.line == line_num {
        span.end.col.saturating_sub(span.start.col)
    } else {
        line.chars().count() + 1 - span.start.col.min(line.chars().count() + 1)
    };

    eprintln!("{}", cformat!("     <blue>--></> <underline>{}:{}</>", file, span.start));
    eprintln!("{}", cformat!("      <blue>|</>"));
    eprintln!("{}", cformat!(" <blue>{:>4} |</> {}", line_num, line));
    eprintln!(
        "{}",
        cformat!(
            "      <blue>|</> {}<red,bold>{}</>",
            " ".repeat(span.start.col.saturating_sub(1)),
            "^".repeat(width.max(1))
        )
    );
}
