use clap::Parser;
use barlens::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
