//! `goonj` - operator CLI for the Goonj storefront.

use std::process::ExitCode;

use clap::Parser;

use goonj_storefront::cli::Cli;
use goonj_storefront::{init_tracing, run};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
