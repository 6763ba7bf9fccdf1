//! steeple-connect - Manage social platform connections

use clap::{Parser, Subcommand};
use libsteeplecast::service::SteeplecastService;
use libsteeplecast::{Platform, Result, Session, SteeplecastError};

#[derive(Parser, Debug)]
#[command(name = "steeple-connect")]
#[command(version)]
#[command(about = "Manage social platform connections")]
#[command(long_about = "\
steeple-connect - Manage social platform connections

DESCRIPTION:
    steeple-connect drives the OAuth flow for the supported social
    platforms. Print an authorization URL, open it in a browser, then feed
    the code and state from the callback back in to complete the
    connection.

COMMANDS:
    url         Print the authorization URL for a platform
    callback    Complete an OAuth callback with its code and state
    disconnect  Remove the stored connection for a platform
    list        Show connection status for every platform

USAGE EXAMPLES:
    # Start connecting a Facebook page
    steeple-connect url facebook

    # Complete the callback after the browser redirect
    steeple-connect callback facebook --code AQD... --state facebook_x1y2z3

    # Show all connections as JSON
    steeple-connect list --format json

CONFIGURATION:
    Configuration file: ~/.config/steeplecast/config.toml

    Session identity comes from environment variables:
        STEEPLECAST_USER    - Authenticated user id
        STEEPLECAST_TOKEN   - Session bearer token
        STEEPLECAST_CHURCH  - Church id (optional)

EXIT CODES:
    0 - Success
    1 - Operation failed
    2 - Authorization error (state mismatch, user mismatch, no session)
    3 - Invalid input
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the authorization URL for a platform
    Url {
        /// Platform to connect (facebook, instagram, youtube, tiktok)
        platform: String,
    },

    /// Complete an OAuth callback
    Callback {
        /// Platform the callback belongs to
        platform: String,

        /// Authorization code returned by the platform
        #[arg(long)]
        code: String,

        /// State parameter returned by the platform
        #[arg(long)]
        state: String,

        /// User id the connection is for (defaults to the session user)
        #[arg(long)]
        user: Option<String>,
    },

    /// Remove the stored connection for a platform
    Disconnect {
        /// Platform to disconnect
        platform: String,
    },

    /// Show connection status for every platform
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    libsteeplecast::logging::init_from_env(level);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let session = Session::from_env()?;
    let service = SteeplecastService::new().await?;

    match cli.command {
        Commands::Url { platform } => {
            let platform: Platform = platform.parse()?;
            let redirect_uri = service.connector().callback_url(platform);
            let issued = service
                .connector()
                .authorize_url(&session, platform, &redirect_uri)
                .await?;

            println!("{}", issued.url);
            eprintln!("Open the URL in a browser, then run 'steeple-connect callback {}' with the returned code and state.", platform);
        }

        Commands::Callback {
            platform,
            code,
            state,
            user,
        } => {
            let platform: Platform = platform.parse()?;
            let user = user.unwrap_or_else(|| session.user_id().to_string());
            let account = service
                .connector()
                .handle_callback(&session, platform, &code, &state, &user)
                .await?;

            println!("Connected {} as '{}'", platform, account.display_name());
        }

        Commands::Disconnect { platform } => {
            let platform: Platform = platform.parse()?;
            service.connector().disconnect(&session, platform).await?;
            println!("Disconnected {}", platform);
        }

        Commands::List { format } => {
            let connections = service.connector().list_connections(&session).await?;

            match format.as_str() {
                "json" => {
                    let json = serde_json::to_string_pretty(&connections)
                        .map_err(|e| SteeplecastError::InvalidInput(e.to_string()))?;
                    println!("{}", json);
                }
                "text" => {
                    for connection in connections {
                        let status = if connection.connected {
                            format!("connected as: {}", connection.account_name)
                        } else {
                            "not connected".to_string()
                        };
                        println!("{:<10} {}", connection.platform.as_str(), status);
                    }
                }
                other => {
                    return Err(SteeplecastError::InvalidInput(format!(
                        "Unknown format: '{}'. Valid options: text, json",
                        other
                    )));
                }
            }
        }
    }

    Ok(())
}
