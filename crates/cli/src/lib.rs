pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use skinsafe_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};

#[derive(Debug, Parser)]
#[command(
    name = "skinsafe",
    about = "Skincare routine safety CLI",
    long_about = "Analyze skincare routines for ingredient conflicts, check new products against an existing routine, and inspect the ingredient knowledge base.",
    after_help = "Examples:\n  skinsafe analyze --routine routine.json\n  skinsafe check-addition --routine routine.json --product serum.json\n  skinsafe resolve \"Sodium Hyaluronate\" aqua\n  skinsafe doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to load instead of skinsafe.toml discovery")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Analyze a routine JSON file and print the scored report")]
    Analyze {
        #[arg(long, help = "Routine JSON: {morning, evening, products}")]
        routine: PathBuf,
    },
    #[command(about = "Check one new product against an existing routine")]
    CheckAddition {
        #[arg(long, help = "Existing routine JSON")]
        routine: PathBuf,
        #[arg(long, help = "Product JSON: {name, ingredients, slot?}")]
        product: PathBuf,
    },
    #[command(about = "Cross-reference one product against a skin profile")]
    Personalize {
        #[arg(long, help = "Profile JSON: {skin_type, skin_concerns, ingredient_allergies}")]
        profile: PathBuf,
        #[arg(long, help = "Product JSON: {name, ingredients}")]
        product: PathBuf,
    },
    #[command(about = "Resolve free-text ingredient names to canonical ids")]
    Resolve {
        #[arg(required = true, help = "Ingredient names to resolve")]
        names: Vec<String>,
    },
    #[command(about = "List knowledge-base conflict rules")]
    Rules {
        #[arg(long, help = "Only list rules involving this ingredient")]
        ingredient: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and knowledge-base readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config.logging);
    }

    let result = match cli.command {
        Command::Analyze { routine } => commands::analyze::run(&options, &routine),
        Command::CheckAddition { routine, product } => {
            commands::addition::run(&options, &routine, &product)
        }
        Command::Personalize { profile, product } => {
            commands::personalize::run(&options, &profile, &product)
        }
        Command::Resolve { names } => commands::resolve::run(&options, &names),
        Command::Rules { ingredient } => commands::rules::run(&options, ingredient.as_deref()),
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout carries only command output.
fn init_logging(logging: &LoggingConfig) {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    let _ = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
