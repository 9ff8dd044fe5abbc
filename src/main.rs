mod app;
mod cli;
mod domain;
mod infra;
mod prattle;
#[cfg(test)]
mod test_support;
mod ui;
mod usecases;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    app::run(cli)
}
