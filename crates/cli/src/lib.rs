pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "catalog",
    about = "Catalog operator CLI",
    long_about = "Prepare the catalog store, load baseline products, and resolve product codes.",
    after_help = "Examples:\n  catalog migrate\n  catalog seed\n  catalog lookup E33"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Ensure the product schema exists and matches")]
    Migrate,
    #[command(about = "Ensure the schema and insert baseline products into an empty catalog")]
    Seed,
    #[command(about = "Resolve one live product by its exact code")]
    Lookup {
        #[arg(help = "Product code, matched exactly and case-sensitively")]
        code: String,
    },
    #[command(about = "Print the effective configuration")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Lookup { code } => commands::lookup::run(&code),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
