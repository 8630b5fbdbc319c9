use clap::Parser;
use std::error::Error;

mod collection;
mod commands;
mod convert;
mod core;
mod scenario;

use core::exit_code::ExitCode;
use core::logger::Logger;

#[derive(Parser)]
#[command(name = "pmcuke")]
#[command(
    about = "Converts a Postman collection into Gherkin feature files and Cypress step definitions."
)]
#[command(version = crate::core::version::app_version())]
struct Args {
    #[arg(short, long, help = "Enable debug logging")]
    debug: bool,

    #[command(flatten)]
    convert: commands::convert::ConvertArgs,
}

fn main() {
    let args = Args::parse();
    Logger::init(args.debug);

    if let Err(e) = commands::convert::execute_convert(&args.convert) {
        eprintln!("Error: {e}");
        if Logger::is_debug() {
            let mut cause = e.source();
            while let Some(inner) = cause {
                eprintln!("  caused by: {inner}");
                cause = inner.source();
            }
        }
        std::process::exit(ExitCode::from(&e).code());
    }
}
