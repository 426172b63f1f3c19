//! crudpanel
//!
//! Create, read, update and delete Reddit posts and YouTube videos from the
//! command line. Every invocation submits credentials, runs one action and
//! exits.
//!
//! # Usage
//!
//! ```bash
//! # Credentials come from flags or the environment
//! export REDDIT_CLIENT_ID=... REDDIT_CLIENT_SECRET=... REDDIT_USER_AGENT=...
//! export REDDIT_USERNAME=... REDDIT_PASSWORD=...
//!
//! crudpanel reddit create-text test "Hello" "First post"
//! crudpanel reddit read test --limit 5
//! crudpanel reddit delete --url https://www.reddit.com/r/test/comments/abc123/hello/
//!
//! YOUTUBE_API_KEY=... crudpanel youtube list --limit 10
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crudpanel_core::{
    display_error, AppConfig, CoreError, Credentials, ErrorReporter, MediaPayload,
    RedditCredentials, YouTubeCredentials,
};
use crudpanel_session::{execute, Action, CredentialStore};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "crudpanel=info,reddit_client=info,youtube_client=info,crudpanel_session=info";
const VERBOSE_LOG_FILTER: &str =
    "crudpanel=debug,reddit_client=debug,youtube_client=debug,crudpanel_session=debug";

#[derive(Parser)]
#[command(name = "crudpanel")]
#[command(about = "Manage Reddit posts and YouTube videos")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reddit posts in a subreddit
    Reddit {
        #[command(flatten)]
        auth: RedditAuth,

        #[command(subcommand)]
        action: RedditCommand,
    },

    /// YouTube videos
    Youtube {
        /// YouTube Data API key
        #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: String,

        #[command(subcommand)]
        action: YouTubeCommand,
    },
}

#[derive(Args)]
struct RedditAuth {
    #[arg(long, env = "REDDIT_CLIENT_ID", hide_env_values = true)]
    client_id: String,

    #[arg(long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// User agent Reddit sees, e.g. "crudpanel/0.1 by yourname"
    #[arg(long, env = "REDDIT_USER_AGENT")]
    user_agent: String,

    #[arg(long, env = "REDDIT_USERNAME")]
    username: String,

    #[arg(long, env = "REDDIT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum RedditCommand {
    /// Submit a text post
    CreateText {
        subreddit: String,
        title: String,
        body: String,
    },

    /// Submit an image post
    CreateImage {
        subreddit: String,
        title: String,
        file: PathBuf,
    },

    /// Submit a video post
    CreateVideo {
        subreddit: String,
        title: String,
        file: PathBuf,
    },

    /// List your recent posts in a subreddit
    Read {
        subreddit: String,

        /// Author to filter by (defaults to the logged-in account)
        #[arg(long)]
        author: Option<String>,

        /// Stop after this many matching posts
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Replace the body of a post
    Update {
        post_id: String,

        /// Required, but Reddit keeps the original title
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        body: String,
    },

    /// Delete a post by id or permalink
    Delete {
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        id: Option<String>,

        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Subcommand)]
enum YouTubeCommand {
    /// Upload a public video
    Upload {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// Numeric category id (22 is "People & Blogs")
        #[arg(long, default_value_t = 22)]
        category: u32,

        file: PathBuf,
    },

    /// Delete a video by id
    Delete { video_id: String },

    /// List videos from the most-popular chart
    List {
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let mut store = CredentialStore::new(config);

    match run(&mut store, cli.command).await {
        Ok(rendered) => {
            println!("{}", rendered.trim_end());
            Ok(())
        }
        Err(e) => {
            ErrorReporter::new().report_error(&e);
            eprintln!("{}", display_error(&e));
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(store: &mut CredentialStore, command: Command) -> Result<String, CoreError> {
    let action = match command {
        Command::Reddit { auth, action } => {
            let credentials = RedditCredentials::new(
                auth.client_id,
                auth.client_secret,
                auth.user_agent,
                auth.username,
                auth.password,
            )?;
            let outcome = store.submit(Credentials::Reddit(credentials)).await?;
            info!("{}", outcome);
            reddit_action(action, outcome.identity.as_deref().unwrap_or_default()).await?
        }
        Command::Youtube { api_key, action } => {
            let credentials = YouTubeCredentials::new(api_key)?;
            store.submit(Credentials::YouTube(credentials)).await?;
            youtube_action(action).await?
        }
    };

    let outcome = execute(store, action).await?;
    Ok(outcome.to_string())
}

async fn reddit_action(command: RedditCommand, logged_in_as: &str) -> Result<Action, CoreError> {
    match command {
        RedditCommand::CreateText {
            subreddit,
            title,
            body,
        } => Action::create_text_post(subreddit, title, body),
        RedditCommand::CreateImage {
            subreddit,
            title,
            file,
        } => Action::create_image_post(subreddit, title, read_media(&file).await?),
        RedditCommand::CreateVideo {
            subreddit,
            title,
            file,
        } => Action::create_video_post(subreddit, title, read_media(&file).await?),
        RedditCommand::Read {
            subreddit,
            author,
            limit,
        } => Action::read_posts(
            subreddit,
            author.unwrap_or_else(|| logged_in_as.to_string()),
            limit,
        ),
        RedditCommand::Update {
            post_id,
            title,
            body,
        } => Action::update_post(post_id, title, body),
        RedditCommand::Delete { id: Some(id), .. } => Action::delete_post(id),
        RedditCommand::Delete { url: Some(url), .. } => Action::delete_post_by_url(&url),
        RedditCommand::Delete { .. } => Err(CoreError::missing_field("id")),
    }
}

async fn youtube_action(command: YouTubeCommand) -> Result<Action, CoreError> {
    match command {
        YouTubeCommand::Upload {
            title,
            description,
            tags,
            category,
            file,
        } => Action::upload_video(title, description, tags, category, read_media(&file).await?),
        YouTubeCommand::Delete { video_id } => Action::delete_video(video_id),
        YouTubeCommand::List { limit } => Ok(Action::list_videos(limit)),
    }
}

/// Loads a local file the way the web form would hand it over.
async fn read_media(path: &Path) -> Result<MediaPayload, CoreError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CoreError::invalid_input(format!("{} is not a file", path.display())))?;
    let bytes = tokio::fs::read(path).await?;
    MediaPayload::new(file_name, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const REDDIT_AUTH: [&str; 10] = [
        "--client-id",
        "id",
        "--client-secret",
        "secret",
        "--user-agent",
        "ua/1.0",
        "--username",
        "tester",
        "--password",
        "pw",
    ];

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("crudpanel").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reddit_read() {
        let mut args = vec!["reddit"];
        args.extend(REDDIT_AUTH);
        args.extend(["read", "test", "--limit", "5"]);

        let cli = parse(&args).unwrap();
        match cli.command {
            Command::Reddit {
                auth,
                action:
                    RedditCommand::Read {
                        subreddit,
                        author,
                        limit,
                    },
            } => {
                assert_eq!(auth.username, "tester");
                assert_eq!(subreddit, "test");
                assert_eq!(author, None);
                assert_eq!(limit, Some(5));
            }
            _ => panic!("Expected reddit read"),
        }
    }

    #[test]
    fn test_delete_needs_id_or_url() {
        let mut args = vec!["reddit"];
        args.extend(REDDIT_AUTH);
        args.push("delete");
        assert!(parse(&args).is_err());

        let mut args = vec!["reddit"];
        args.extend(REDDIT_AUTH);
        args.extend(["delete", "--id", "a", "--url", "b"]);
        assert!(parse(&args).is_err());
    }

    #[test]
    fn test_parse_youtube_list_defaults() {
        let cli = parse(&["youtube", "--api-key", "k", "list"]).unwrap();
        match cli.command {
            Command::Youtube {
                api_key,
                action: YouTubeCommand::List { limit },
            } => {
                assert_eq!(api_key, "k");
                assert_eq!(limit, 10);
            }
            _ => panic!("Expected youtube list"),
        }
    }

    #[tokio::test]
    async fn test_read_media_rejects_missing_file() {
        let error = read_media(Path::new("/no/such/file.png")).await.unwrap_err();
        assert!(matches!(error, CoreError::Io(_)));
    }
}
