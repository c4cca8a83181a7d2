//! bsky - per-user Bluesky client
//!
//! Each invocation runs one command on behalf of one local user, whose
//! session is kept in the credential store between runs.

mod messages;

use std::process::ExitCode;
use std::sync::Arc;

use bsky_session::{BskyError, BskyService, Config, Language, UserIdentity};
use bsky_xrpc::XrpcClient;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::messages::Messages;

#[derive(Parser)]
#[command(name = "bsky", version, about = "Bluesky client with per-user sessions")]
struct Cli {
    /// Local user the command runs as
    #[arg(long, env = "BSKY_USER")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with a handle (bare names get the default domain) and app password
    Login { handle: String, password: String },
    /// Forget the stored session
    Logout,
    /// Publish a text post
    Post {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Show the home timeline
    Tl,
    /// List saved and authored custom feeds
    Feeds,
    /// Show a custom feed by name, URI fragment or handle/collection/rkey path
    Feed {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
    },
    /// Set the message language (ja or en)
    Lang { language: Language },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();

    let Some(user) = UserIdentity::new(cli.user) else {
        eprintln!("--user must not be empty");
        return ExitCode::FAILURE;
    };

    let client = match XrpcClient::with_config(&config.service_url, config.request_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    info!(service = %config.service_url, store = ?config.store_path, "Starting bsky");

    let service = BskyService::open(&config, Arc::new(client)).await;
    let result = run(&service, &user, cli.command).await;
    service.shutdown().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let messages = Messages(service.registry.language(&user).await);
            eprintln!("{}", messages.error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(service: &BskyService, user: &UserIdentity, command: Command) -> Result<(), BskyError> {
    let messages = Messages(service.registry.language(user).await);

    match command {
        Command::Login { handle, password } => {
            let session = service.registry.login(user, &handle, &password).await?;
            println!("{}", messages.login_ok(&session.handle));
        }
        Command::Logout => {
            if service.registry.logout(user).await {
                println!("{}", messages.logout_ok());
            } else {
                println!("{}", messages.not_logged_in());
            }
        }
        Command::Post { text } => {
            service.content.post(user, &text.join(" ")).await?;
            println!("{}", messages.post_ok());
        }
        Command::Tl => {
            let items = service.content.fetch_timeline(user).await?;
            println!("{}", messages.timeline_header());
            for item in &items {
                println!("{}", messages.item(item));
            }
        }
        Command::Feeds => {
            let listing = service.feeds.list_feeds(user).await?;
            println!("{}", messages.saved_feeds_header());
            for feed in &listing.saved {
                println!("{}", messages.feed_line(&feed.display_name, &feed.uri));
            }
            println!();
            println!("{}", messages.authored_feeds_header());
            for feed in &listing.authored {
                println!("{}", messages.feed_line(&feed.display_name, &feed.uri));
            }
        }
        Command::Feed { reference } => {
            let uri = match service.feeds.resolve(user, &reference.join(" ")).await {
                Ok(uri) => uri,
                Err(e @ BskyError::FeedResolution { .. }) => {
                    let names = service.feeds.cached_feed_names(user).await;
                    if let Some(names) = names.filter(|n| !n.is_empty()) {
                        eprintln!("{}", messages.known_feeds_header());
                        for name in &names {
                            eprintln!("- {name}");
                        }
                    }
                    return Err(e);
                }
                Err(e) => return Err(e),
            };
            let items = service.content.fetch_feed(user, &uri).await?;
            println!("{}", messages.feed_header(uri.as_str()));
            for item in &items {
                println!("{}", messages.item(item));
            }
        }
        Command::Lang { language } => {
            service.registry.set_language(user, language).await;
            println!("{}", Messages(language).language_set());
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bsky=info,bsky_session=info"));

    // Use JSON format for Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
