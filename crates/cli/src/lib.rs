pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use courier_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Conversational email and calendar assistant",
    long_about = "Chat with Courier to draft emails, schedule calendar events, and manage the \
                  contact directory. Every side effect is staged behind an explicit \
                  confirmation.",
    after_help = "Examples:\n  courier chat\n  courier chat --provider outlook\n  courier \
                  contacts find jane\n  courier config"
)]
pub struct Cli {
    /// Path to courier.toml (defaults to ./courier.toml or ./config/courier.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive chat session")]
    Chat {
        #[arg(long, help = "Service provider for dispatch (gmail or outlook)")]
        provider: Option<String>,
        #[arg(long, help = "Resume an existing conversation thread id")]
        thread: Option<String>,
    },
    #[command(about = "Inspect or edit the contact directory")]
    Contacts {
        #[command(subcommand)]
        command: commands::contacts::ContactsCommand,
    },
    #[command(about = "Show the effective configuration with secrets redacted")]
    Config,
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Chat { provider, thread } => {
            commands::chat::run(&config, provider, thread).await
        }
        Command::Contacts { command } => commands::contacts::run(&config, command),
        Command::Config => commands::config::run(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
