//! annoforge command-line entrypoint.

use annoforge_compiler::cli::{run_cli, Cli};
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_cli(cli)
}
