use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use slackline_api::AuthError;
use slackline_cli::{logging::init_logging, App, AppConfig, Cli, Command};
use slackline_store::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report(&e),
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\n\nGoodbye! 👋");
            ExitCode::SUCCESS
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.command == Command::AuthHelp {
        println!("{}", slackline_cli::help::AUTH_HELP);
        return Ok(());
    }

    let settings = match &cli.config_dir {
        Some(dir) => Settings::open(dir)?,
        None => Settings::open_default()?,
    };

    let config = AppConfig::load(settings.config_dir())
        .context("Failed to load configuration")?;
    init_logging(&config);

    tracing::debug!(config_dir = %settings.config_dir().display(), "settings loaded");

    let mut app = App::new(settings, config, io::stdout())
        .with_token(cli.token, cli.save_token)
        .with_types(cli.types);
    app.run(cli.command).await
}

fn report(e: &anyhow::Error) -> ExitCode {
    if let Some(auth) = e.downcast_ref::<AuthError>() {
        eprintln!("\n❌ Authentication Error:\n\n{}\n", auth);
        eprintln!("For help with authentication, run: slackline auth-help");
    } else {
        eprintln!("✗ {:#}", e);
    }
    ExitCode::from(1)
}
