use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use scribe_client::ApiClient;
use scribe_config::{Config, LogFormat};
use scribe_store::{FileCredentialStore, FileSessionStore};
use scribe_types::{ApiError, LoginParams, LoginType, Method, Notifier, PageQuery, SessionStore};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scribe", about = "scribe — admin client for the blog content API")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Credentials file (default: ~/.scribe/credentials.json).
    #[arg(long, value_name = "PATH", global = true)]
    credentials: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in with account and password.
    Login {
        identifier: String,
        /// Read from `SCRIBE_PASSWORD` when omitted.
        #[arg(long, env = "SCRIBE_PASSWORD", hide_env_values = true)]
        password: String,
        /// email / phone / account.
        #[arg(long, default_value = "account")]
        login_type: LoginType,
    },
    /// Forget the stored credentials.
    Logout,
    /// Show whether credentials are stored.
    Status,
    /// Exchange the refresh token for a new pair.
    Refresh,
    /// GET an arbitrary path relative to the API base and print `data`.
    Get { path: String },
    /// List posts.
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        /// Keyword filter.
        #[arg(long)]
        word: Option<String>,
    },
    /// List all tags.
    Tags,
    /// List all categories.
    Categories,
}

const SESSION_FILE: &str = "session.json";

/// Prints user-facing errors to stderr.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    init_tracing(&config);
    tracing::debug!(base = %config.api_base(), "configuration loaded");

    let credentials_path = cli
        .credentials
        .or_else(|| config.credentials_file.clone())
        .unwrap_or_else(default_credentials_path);
    // The logged-in user is kept beside the credentials.
    let session = Arc::new(FileSessionStore::open(
        credentials_path.with_file_name(SESSION_FILE),
    ));
    let credentials = Arc::new(FileCredentialStore::open(credentials_path));
    let client = ApiClient::with_reqwest(&config, credentials.clone(), session.clone())
        .with_notifier(Arc::new(StderrNotifier));

    match cli.command {
        Commands::Login {
            identifier,
            password,
            login_type,
        } => {
            let params = LoginParams {
                login_type,
                ..LoginParams::account(identifier, password)
            };
            client.auth().login(&params).await.map_err(report(&client))?;
            eprintln!("logged in as {}", params.identifier);
        }
        Commands::Logout => {
            scribe_auth::logout(credentials.as_ref(), session.as_ref());
            eprintln!("logged out");
        }
        Commands::Status => {
            let status = if scribe_auth::is_authenticated(credentials.as_ref()) {
                "authenticated"
            } else {
                "not authenticated"
            };
            match session.user() {
                Some(user) => println!("{}: {status} as {}", config.api_base(), user.identifier),
                None => println!("{}: {status}", config.api_base()),
            }
        }
        Commands::Refresh => {
            client
                .refresh()
                .await
                .map_err(|e| anyhow::anyhow!("refresh failed: {e}"))?;
            eprintln!("credentials refreshed");
        }
        Commands::Get { path } => {
            let data = client
                .execute(&path, Method::GET, None, Vec::new())
                .await
                .map_err(report(&client))?;
            print_json(&data)?;
        }
        Commands::Posts { page, size, word } => {
            let mut query = PageQuery::page(page, size);
            if let Some(word) = word {
                query = query.filter("word", word);
            }
            let posts = client.posts().page(&query).await.map_err(report(&client))?;
            print_json(&posts)?;
        }
        Commands::Tags => print_json(&client.tags().list().await.map_err(report(&client))?)?,
        Commands::Categories => print_json(
            &client
                .categories()
                .list(None)
                .await
                .map_err(report(&client))?,
        )?,
    }
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_target(false).init(),
    }
}

/// Hands an [`ApiError`] to the client's notifier and turns it into an exit error.
fn report(client: &ApiClient) -> impl Fn(ApiError) -> anyhow::Error + '_ {
    move |err| {
        // Session expiry has already been announced by the client.
        if !err.is_session_expired() {
            client.report(&err);
        }
        anyhow::anyhow!("{} error ({}): {}", err.kind(), err.code(), err.message())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render response")?;
    println!("{text}");
    Ok(())
}

fn default_credentials_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".scribe").join("credentials.json")
}
