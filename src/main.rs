//! Cell Reorder CLI
//!
//! Usage:
//!   cell-reorder [OPTIONS] [FILE]
//!
//! Options:
//!   -q, --quiet       Print only the final grid
//!   -a, --animations  Print the animation requests made after each step
//!   -h, --help        Print help
//!
//! Set `RUST_LOG=debug` (or `trace`) to follow the solver.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;

use cell_reorder::{run_scenario_with_config, RunConfig};

#[derive(Parser)]
#[command(name = "cell-reorder")]
#[command(about = "Replay drag-and-drop scenarios on a grid of cells")]
struct Cli {
    /// Scenario file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Print only the final grid
    #[arg(short, long)]
    quiet: bool,

    /// Print the animation requests made after each step
    #[arg(short, long)]
    animations: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let config = RunConfig::new().with_animations(cli.animations);
    match run_scenario_with_config(&source, config) {
        Ok(report) => {
            if cli.quiet {
                println!("{}", report.final_grid());
            } else {
                print!("{}", report.to_text(cli.animations));
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
