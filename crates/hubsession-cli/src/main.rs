//! hubsession - sign in to a GitHub-style REST API from the terminal.
//!
//! On start the saved token is verified; if there is none, or it no longer
//! works, the user is asked for a username and password which are exchanged
//! for a new token.

mod messages;
mod prompt;

use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use hubsession_core::config::ENV_STORE_PASSPHRASE;
use hubsession_core::{
    ApiClient, Config, CredentialStore, EncryptedFileStore, KeyringStore, MemoryStore,
    SessionController, SessionError, StoreBackend, User,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ============================================================================
// Constants
// ============================================================================

/// Sign-in attempts allowed per run before giving up
const MAX_SIGN_IN_ATTEMPTS: usize = 3;

const LOG_FILE_PREFIX: &str = "hubsession.log";

const USAGE: &str = "\
Usage: hubsession [COMMAND] [OPTIONS]

Commands:
  restore   Resume the saved session, signing in if needed (default)
  login     Sign in with username and password
  logout    Forget the saved token
  status    Show the signed-in account without prompting

Options:
  --private     Request access to private repositories
  --public      Request access to public repositories only
  --ephemeral   Do not persist the token
  --json        Print the account as JSON
  -h, --help    Show this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Restore,
    Login,
    Logout,
    Status,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    command: Command,
    /// `None` asks interactively
    private_access: Option<bool>,
    ephemeral: bool,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        command: Command::Restore,
        private_access: None,
        ephemeral: false,
        json: false,
    };

    for arg in args {
        match arg.as_str() {
            "restore" => parsed.command = Command::Restore,
            "login" => parsed.command = Command::Login,
            "logout" => parsed.command = Command::Logout,
            "status" => parsed.command = Command::Status,
            "-h" | "--help" | "help" => parsed.command = Command::Help,
            "--private" => parsed.private_access = Some(true),
            "--public" => parsed.private_access = Some(false),
            "--ephemeral" => parsed.ephemeral = true,
            "--json" => parsed.json = true,
            other => anyhow::bail!("Unknown argument: {}\n\n{}", other, USAGE),
        }
    }
    Ok(parsed)
}

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn build_store(config: &Config, ephemeral: bool) -> Result<Arc<dyn CredentialStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store: Arc<dyn CredentialStore> = match config.store {
        StoreBackend::Keyring => Arc::new(KeyringStore::for_api(&config.api_base_url)),
        StoreBackend::File => {
            let passphrase = std::env::var(ENV_STORE_PASSPHRASE).with_context(|| {
                format!("{} must be set to use the file store", ENV_STORE_PASSPHRASE)
            })?;
            Arc::new(EncryptedFileStore::new(config.token_file_path()?, passphrase))
        }
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;
    if args.command == Command::Help {
        println!("{}", USAGE);
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load()?;
    let _log_guard = init_tracing(config.log_dir.as_deref());
    info!(api = %config.api_base_url, store = ?config.store, "hubsession starting");

    if config.client_id.is_empty() {
        warn!("No OAuth client id configured; the API may refuse token requests");
    }

    let api = Arc::new(ApiClient::from_config(&config)?);
    let store = build_store(&config, args.ephemeral)?;
    let session = SessionController::new(api.clone(), api, store, config.oauth_app())
        .with_policy(config.session_policy());

    let code = match args.command {
        Command::Restore => match session.restore().await {
            Ok(Some(user)) => {
                print_user(&user, args.json)?;
                ExitCode::SUCCESS
            }
            Ok(None) => sign_in(&session, &mut config, &args).await?,
            Err(err @ (SessionError::SessionRevoked { .. } | SessionError::Connection(_))) => {
                show_alert(&err);
                sign_in(&session, &mut config, &args).await?
            }
            Err(err) => {
                show_alert(&err);
                ExitCode::FAILURE
            }
        },
        Command::Login => sign_in(&session, &mut config, &args).await?,
        Command::Logout => match session.logout() {
            Ok(()) => {
                println!("Signed out.");
                ExitCode::SUCCESS
            }
            Err(err) => {
                show_alert(&err);
                ExitCode::FAILURE
            }
        },
        Command::Status => match session.restore().await {
            Ok(Some(user)) => {
                print_user(&user, args.json)?;
                ExitCode::SUCCESS
            }
            Ok(None) => {
                println!("Not signed in.");
                ExitCode::FAILURE
            }
            Err(err) => {
                show_alert(&err);
                ExitCode::FAILURE
            }
        },
        Command::Help => ExitCode::SUCCESS,
    };

    info!("hubsession exiting");
    Ok(code)
}

/// Show the sign-in form until it succeeds, fails for a reason the user
/// cannot fix by retyping, or runs out of attempts
async fn sign_in(session: &SessionController, config: &mut Config, args: &Args) -> Result<ExitCode> {
    for attempt in 1..=MAX_SIGN_IN_ATTEMPTS {
        let username = prompt::username(config.last_username.as_deref())?;
        let password = prompt::password()?;
        let private_access = match args.private_access {
            Some(choice) => choice,
            None => prompt::private_access()?,
        };

        println!("Signing in...");
        match session.login(&username, &password, private_access).await {
            Ok(user) => {
                if config.last_username.as_deref() != Some(user.login.as_str()) {
                    config.last_username = Some(user.login.clone());
                    if let Err(e) = config.save() {
                        warn!(error = %e, "Failed to save config");
                    }
                }
                print_user(&user, args.json)?;
                return Ok(ExitCode::SUCCESS);
            }
            Err(err) => {
                show_alert(&err);
                let retryable = matches!(
                    err,
                    SessionError::MissingInput | SessionError::InvalidCredentials { .. }
                );
                if !retryable {
                    return Ok(ExitCode::FAILURE);
                }
                warn!(attempt, "Sign-in attempt failed");
            }
        }
    }
    Ok(ExitCode::FAILURE)
}

fn show_alert(err: &SessionError) {
    let (title, body) = messages::alert_for(err);
    eprintln!("{}: {}", title, body);
}

fn print_user(user: &User, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!("Signed in as {} ({})", user.display_name(), user.login);
    }
    Ok(())
}
