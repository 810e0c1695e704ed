//! reddit-oauth -- authorize against Reddit from the command line.
//!
//! Loads the client registration, prints the consent URL, waits for the
//! authorization code (redirect listener or pasted by hand), exchanges it,
//! and prints the authenticated identity.

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use reddit_oauth::AuthError;
use reddit_oauth::config::Config;
use reddit_oauth::models::Identity;
use reddit_oauth::oauth::{AuthorizationFlow, CallbackListener, CodeProvider, HtmlResponder};

// ---------------------------------------------------------------------------
// CLI argument parsing (minimal, no clap dependency)
// ---------------------------------------------------------------------------

struct CliArgs {
    config_path: PathBuf,
    manual: bool,
}

fn parse_args() -> CliArgs {
    let mut args = std::env::args().skip(1);
    let mut config_path = PathBuf::from("reddit-oauth.toml");
    let mut manual = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                if let Some(path) = args.next() {
                    config_path = PathBuf::from(path);
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--manual" | "-m" => manual = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("reddit-oauth {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Run with --help for usage information.");
                std::process::exit(1);
            }
        }
    }

    CliArgs {
        config_path,
        manual,
    }
}

fn print_usage() {
    println!(
        "\
reddit-oauth {version} -- Reddit OAuth2 login

USAGE:
    reddit-oauth [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file [default: reddit-oauth.toml]
    -m, --manual           Paste the authorization code instead of running
                           the redirect listener
    -h, --help             Print this help message
    -V, --version          Print version information

ENVIRONMENT:
    RUST_LOG               Override log level (e.g. RUST_LOG=debug)
    REDDIT_OAUTH_CONFIG    Alternative to --config flag
    REDDIT_OAUTH_*         Per-setting overrides (e.g. REDDIT_OAUTH_CLIENT_ID)
",
        version = env!("CARGO_PKG_VERSION")
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // 1. Parse CLI arguments
    let cli = parse_args();

    // Allow REDDIT_OAUTH_CONFIG env var as alternative to --config flag
    let config_path = std::env::var("REDDIT_OAUTH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or(cli.config_path);

    // 2. Load and check configuration
    let config = Config::load(&config_path)?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        overrides = config.env_overrides.all().len(),
        "Starting reddit-oauth"
    );

    // 3. Pick how the authorization code comes back
    let provider = match (cli.manual, config.oauth.callback_port) {
        (false, Some(port)) => CodeProvider::Listener(
            CallbackListener::new(port).with_responder(HtmlResponder::new("reddit-oauth")),
        ),
        _ => CodeProvider::resolver(|_state: String| read_code_from_stdin()),
    };

    // 4. Run the authorization flow
    let client_config = config.oauth.client_config()?;
    let flow = AuthorizationFlow::new(client_config, provider)?;
    let mut session = flow
        .run(|url| async move {
            println!("Open this URL in a browser and approve access:\n\n    {url}\n");
            Ok::<_, AuthError>(())
        })
        .await?;

    tracing::info!(
        scopes = ?session.granted_scopes(),
        expires_at = %session.expires_at(),
        "Authorized"
    );

    // 5. Prove the session works
    let me_url = flow.config().endpoints.api_url("/api/v1/me")?;
    let me: Identity = session.get(me_url).await?;
    println!(
        "Logged in as u/{} (link karma {}, comment karma {})",
        me.name, me.link_karma, me.comment_karma
    );
    println!(
        "Refresh token issued: {}",
        if session.refresh_token().is_some() { "yes" } else { "no" }
    );

    Ok(())
}

/// Read one line from stdin: the `code` parameter of the redirect.
async fn read_code_from_stdin() -> reddit_oauth::Result<String> {
    println!("After approving, paste the `code` parameter from the redirect URL:");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(|e| AuthError::denied(format!("could not read authorization code: {e}")))?;
    Ok(line.trim().to_string())
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

fn init_tracing(config: &Config) {
    // RUST_LOG env var takes precedence over config file
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.logging.level;
        // Set this crate to the configured level, dependencies to warn
        EnvFilter::new(format!("reddit_oauth={level},warn"))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if config.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
