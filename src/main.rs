//! Jot - post feeds from the command line
//!
//! Posts live in a SQLite-backed ordered store under the data directory.
//!
//! ```text
//! jot post --uid u1 --name Alice "hello https://example.com"
//! jot feed
//! jot user u1
//! jot show post!00000000001792108800
//! jot delete --uid u1 post!00000000001792108800
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jot::config::CONFIG_FILE_DEFAULT;
use jot::{render, Config, DeleteOutcome, DisplayPost, PostStore, APP_NAME, APP_VERSION};
use jot_store::{SqliteStore, SystemClock};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Log filter when `-v` is not given
const LOG_FILTER_DEFAULT: &str = "info,sqlx=warn";

// =============================================================================
// CLI
// =============================================================================

/// Jot - global and per-user post feeds
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "Global and per-user post feeds over an ordered key-value store")]
#[command(version)]
struct Cli {
    /// JSON config file
    #[arg(short, long, default_value = CONFIG_FILE_DEFAULT)]
    config: PathBuf,

    /// Data directory (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Feed length (overrides the config file)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a post to both feeds
    Post {
        /// Author uid
        #[arg(long)]
        uid: String,
        /// Author display name
        #[arg(long)]
        name: String,
        /// Post text; escaped and autolinked before storing
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Newest posts across all users
    Feed,
    /// Newest posts by one user
    User {
        /// Author uid
        uid: String,
    },
    /// One post by key
    Show {
        /// Key from a feed listing
        key: String,
    },
    /// Delete a post from both feeds
    Delete {
        /// Uid making the request
        #[arg(long)]
        uid: String,
        /// Uid the post is claimed to belong to (defaults to --uid)
        #[arg(long)]
        owner: Option<String>,
        /// Key from a feed listing
        key: String,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Environment first so RUST_LOG from .env is honored
    dotenvy::dotenv().ok();

    let mut config = Config::load(&cli.config).await?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(limit) = cli.limit {
        config.feed_limit = limit;
    }
    config.validate()?;

    // Initialize logging
    let filter = match cli.verbose {
        0 => config
            .log_filter
            .clone()
            .unwrap_or_else(|| LOG_FILTER_DEFAULT.to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    tracing::debug!("{} v{}", APP_NAME, APP_VERSION);

    let data_dir = config.data_dir_path();
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    tracing::debug!("Data directory: {}", data_dir.display());

    let store = SqliteStore::open(&config.database_path())
        .await
        .context("failed to open store")?;
    let posts = PostStore::new(Arc::new(store), Arc::new(SystemClock));

    let result = run(&posts, &config, cli.command, cli.json).await;
    posts.close().await?;
    result
}

async fn run(posts: &PostStore, config: &Config, command: Command, json: bool) -> anyhow::Result<()> {
    match command {
        Command::Post { uid, name, content } => {
            let content = render::prepare_content(&content.join(" "));
            let post = posts.create(&uid, &name, &content).await?;
            println!("{}", jot::keys::global_key(post.created_at));
        }
        Command::Feed => {
            let entries = posts.list_global_recent(config.feed_limit).await?;
            print_feed(entries.into_iter().map(DisplayPost::from).collect(), json)?;
        }
        Command::User { uid } => {
            let entries = posts.list_user_recent(&uid, config.feed_limit).await?;
            print_feed(entries.into_iter().map(DisplayPost::from).collect(), json)?;
        }
        Command::Show { key } => {
            let entry = posts.get_by_key(&key).await?;
            print_feed(vec![DisplayPost::from(entry)], json)?;
        }
        Command::Delete { uid, owner, key } => {
            let owner = owner.unwrap_or_else(|| uid.clone());
            match posts.delete(&uid, &owner, &key).await? {
                DeleteOutcome::Unauthorized => {
                    anyhow::bail!("{uid} may not delete posts belonging to {owner}");
                }
                DeleteOutcome::Deleted {
                    created_at,
                    user_copy_removed,
                } => {
                    println!("deleted {}", jot::keys::global_key(created_at));
                    if !user_copy_removed {
                        eprintln!("warning: the copy in {uid}'s feed could not be removed");
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_feed(posts: Vec<DisplayPost>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }
    if posts.is_empty() {
        println!("no posts");
    }
    for post in posts {
        println!("{}  {} ({})  {}", post.key, post.author_name, post.uid, post.created);
        println!("    {}", post.content);
    }
    Ok(())
}
