#![forbid(unsafe_code)]

//! mflix - movie catalog browser CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("mflix: {e}");
        std::process::exit(e.exit_code());
    }
}
