use clap::Parser;
use picktrack::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
