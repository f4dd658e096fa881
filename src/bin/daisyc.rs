use std::process::ExitCode;

use clap::Parser;
use daisyc::driver::cli::{self, Cli};

fn main() -> ExitCode {
    cli::init_logging();
    let cli = Cli::parse();
    cli::run(cli)
}
