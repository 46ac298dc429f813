use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

use arch::Insn;
use clap::Parser;

use emu::hooks::{dump::Dump, serial::Serial, trace::Trace, Hook};
use emu::{Error, Vm};

#[derive(Parser, Debug)]
#[clap(
    name = "Tau VM",
    version = "v1.0.0",
    about = "Virtual machine for Tau instruction streams"
)]
struct Args {
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    #[arg(short, long)]
    dump_cfg: Option<String>,

    #[arg(short = 'a', long)]
    dump_all: bool,

    #[arg(long)]
    trace: bool,

    #[arg(short, long)]
    output: Option<String>,

    input_file: String,

    #[arg(allow_negative_numbers = true)]
    args: Vec<i64>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("Tau VM");

    println!("+-----------------------------------------------+");
    println!("| Run: {:<40} |", args.input_file);
    if let Some(fname) = &args.dump_cfg {
        println!("|  - Dump: {:<36} |", fname);
    }
    if args.dump_all {
        println!("|  - Dump: {:<36} |", "All");
    }
    println!("+-----------------------------------------------+");

    match run(args) {
        Ok(exit) => {
            println!("=================================================");
            println!("exit: {}", exit);
            ExitCode::from(exit as u8)
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<i64, Error> {
    let file = File::open(&args.input_file)?;
    let program: Vec<Insn> = serde_yaml::from_reader(BufReader::new(file))?;

    let mut hooks: Vec<Box<dyn Hook>> = vec![
        Box::new(Dump::arg(args.dump_cfg, args.dump_all)?),
        Box::new(Serial::arg(true, args.output)?),
    ];
    if args.trace {
        hooks.push(Box::new(Trace));
    }

    let vm = Vm::new(program)?.tmax(args.tmax);
    let mut vm = hooks.into_iter().fold(vm, |vm, hook| vm.hook(hook));
    let outcome = vm.run(&args.args)?;
    Ok(outcome.exit)
}
