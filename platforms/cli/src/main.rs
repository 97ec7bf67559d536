use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use turc::loader::ProgramLoader;
use turc::optimizer::{self, OptConfig};
use turc::simulator::Simulator;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The .tmc decision program to compile
    source: PathBuf,

    /// Write the machine as YAML to this file (default: stdout)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Simulate the compiled machine on this input string
    #[clap(short = 't', long)]
    test: Option<String>,

    /// Step budget for --test runs
    #[clap(long, default_value_t = 10_000_000)]
    max_steps: usize,

    /// Skip the dead-state and merge passes
    #[clap(long)]
    no_opt: bool,

    /// Print machine statistics to stderr
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let program = match ProgramLoader::load_program(Path::new(&cli.source)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let mut machine = match turc::compile(&program) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    if !cli.no_opt {
        optimizer::optimize(&mut machine, &OptConfig::default());
    }

    if let Err(e) = machine.validate() {
        eprintln!("error: {}", e);
        process::exit(1);
    }

    let yaml = turc::encode(&machine);
    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &yaml) {
                eprintln!("error: cannot write {}: {}", path.display(), e);
                process::exit(1);
            }
            if cli.verbose {
                eprintln!("wrote {}", path.display());
            }
        }
        None => print!("{}", yaml),
    }

    if let Some(input) = &cli.test {
        let mut sim = Simulator::with_limit(&machine, cli.max_steps);
        let result = sim.run(input);
        println!("input: {:?}", input);
        println!("result: {}", if result.accepted { "ACCEPT" } else { "REJECT" });
        println!("steps: {}", result.steps);
        if !result.final_tape.is_empty() {
            println!("final tape: {}", result.final_tape);
        }
        if result.hit_limit {
            println!("warning: hit step limit");
        }
    }

    if cli.verbose {
        eprintln!("states: {}", machine.states.len());
        eprintln!("tape alphabet: {}", machine.tape_alphabet.len());
        eprintln!("transitions: {}", machine.transition_count());
    }
}
