//! steeple-post - Create content and publish it to connected platforms

use std::io::Read;

use clap::Parser;
use libsteeplecast::scheduling;
use libsteeplecast::service::{NewContent, SteeplecastService};
use libsteeplecast::{
    Config, ContentStatus, ContentType, Platform, Result, Session, SteeplecastError,
};

#[derive(Parser, Debug)]
#[command(name = "steeple-post")]
#[command(version)]
#[command(about = "Create content and publish it to connected platforms")]
#[command(long_about = "\
steeple-post - Create content and publish it to connected platforms

DESCRIPTION:
    steeple-post creates a content record and fans it out to every
    requested platform in one step. Drafts and scheduled items are stored
    without publishing; note that nothing fires a scheduled post at its
    time. That is left to an external scheduler.

USAGE EXAMPLES:
    # Publish a text post to Facebook now
    steeple-post \"Sunday Service at 10am\" --platform facebook

    # Publish a photo to Facebook and a video to YouTube
    steeple-post \"Easter invite\" --media https://cdn.example.org/easter.mp4 \\
        --type video --platform facebook,youtube

    # Save a draft
    steeple-post \"Working title\" --platform facebook --draft

    # Schedule for later
    steeple-post \"Christmas Eve service\" --platform facebook --at \"dec 24 6pm\"

CONFIGURATION:
    Configuration file: ~/.config/steeplecast/config.toml

    Session identity comes from environment variables:
        STEEPLECAST_USER    - Authenticated user id
        STEEPLECAST_TOKEN   - Session bearer token
        STEEPLECAST_CHURCH  - Church id

EXIT CODES:
    0 - Success
    1 - Publish or storage failure
    2 - Authorization error (no session)
    3 - Invalid input
")]
struct Cli {
    /// Post title (reads from stdin if not provided)
    title: Option<String>,

    /// Longer description appended to the post body
    #[arg(short, long)]
    description: Option<String>,

    /// Media URL to attach (photo or video)
    #[arg(short, long)]
    media: Option<String>,

    /// Content type: image, video or text
    #[arg(short = 't', long = "type", default_value = "text")]
    content_type: String,

    /// Target platform(s), comma-separated (defaults from config)
    #[arg(short, long)]
    platform: Option<String>,

    /// Hashtag to append (repeatable)
    #[arg(long = "hashtag")]
    hashtags: Vec<String>,

    /// Save as draft without publishing
    #[arg(long)]
    draft: bool,

    /// Schedule for later instead of publishing now, e.g. "2h" or "sunday 9am"
    #[arg(long)]
    at: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "error" };
    libsteeplecast::logging::init_from_env(level);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let session = Session::from_env()?;

    let config = Config::load()?;
    let default_platforms = config.defaults.platforms.clone();
    let service = SteeplecastService::from_config(config).await?;

    let title = match cli.title {
        Some(title) => title,
        None => read_stdin()?,
    };

    let platform_list = match &cli.platform {
        Some(csv) => csv.split(',').map(str::trim).map(String::from).collect(),
        None => default_platforms,
    };
    if platform_list.is_empty() {
        return Err(SteeplecastError::InvalidInput(
            "no platforms given and none configured in [defaults]".to_string(),
        ));
    }
    let platforms = platform_list
        .iter()
        .map(|p| p.parse::<Platform>())
        .collect::<Result<Vec<_>>>()?;

    let content_type: ContentType = cli.content_type.parse()?;

    let (status, scheduled_for) = match &cli.at {
        Some(at) => {
            let when = scheduling::parse_schedule(at)?;
            (ContentStatus::Scheduled, Some(when.timestamp()))
        }
        None => (ContentStatus::Draft, None),
    };

    let new = NewContent {
        title,
        description: cli.description,
        content_type,
        media_url: cli.media,
        platforms,
        status,
        scheduled_for,
        hashtags: cli.hashtags,
    };

    // Drafts and scheduled items are stored without touching any platform
    if cli.draft || cli.at.is_some() {
        let content = service.content().create(&session, new).await?;
        print_stored(&cli.format, &content)?;
        return Ok(());
    }

    let response = service.publishing().submit(&session, new).await?;
    match cli.format.as_str() {
        "json" => {
            let json = serde_json::json!({
                "content": response.content,
                "outcomes": response.report.outcomes,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        _ => {
            for outcome in &response.report.outcomes {
                println!(
                    "Posted to {}: {}",
                    outcome.platform.as_str(),
                    outcome.post_id.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| SteeplecastError::InvalidInput(format!("Failed to read stdin: {}", e)))?;

    let title = buffer.trim().to_string();
    if title.is_empty() {
        return Err(SteeplecastError::InvalidInput(
            "Title cannot be empty".to_string(),
        ));
    }
    Ok(title)
}

fn print_stored(format: &str, content: &libsteeplecast::Content) -> Result<()> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(content)
                .map_err(|e| SteeplecastError::InvalidInput(e.to_string()))?;
            println!("{}", json);
        }
        _ => {
            println!("Saved {} '{}' ({})", content.status, content.title, content.id);
        }
    }
    Ok(())
}
