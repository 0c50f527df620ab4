use clap::Parser;
use clean_folder::cli::{Args, run_cli};

fn main() {
    let args = Args::parse();

    // Failures are reported, never turned into a non-zero exit.
    if let Err(e) = run_cli(&args) {
        eprintln!("{}", e);
    }
}
