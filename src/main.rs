//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands::new::NewOptions;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Load and validate the front matter of a personal static site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post, page or draft
    New {
        /// Kind of document to create (post, page, draft) or a post layout
        #[arg(short, long)]
        layout: Option<String>,

        /// Title of the new document
        title: String,

        /// Tags for a new post (repeatable, or space-separated)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Author of the new document
        #[arg(short, long)]
        author: Option<String>,

        /// File name to use instead of the slugified title
        #[arg(short, long)]
        path: Option<String>,
    },

    /// List site content
    #[command(alias = "ls")]
    List {
        /// Type of content to list (posts, pages, drafts, tags, authors)
        #[arg(default_value = "posts")]
        r#type: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one document's metadata and body
    Show {
        /// Document id (e.g. `_posts/2024-11-11-hello`) or source path
        id: String,

        /// Render the markdown body to HTML
        #[arg(long)]
        html: bool,
    },

    /// Validate every document's front matter
    #[command(alias = "c")]
    Check {
        /// Treat warnings as errors
        #[arg(short, long)]
        strict: bool,

        /// Re-check whenever a file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            folio::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            layout,
            title,
            tags,
            author,
            path,
        } => {
            let site = folio::Site::new(&base_dir)?;
            let layout = layout.unwrap_or_else(|| site.config.default_layout.clone());
            tracing::info!("Creating new {} with title: {}", layout, title);
            let options = NewOptions {
                tags,
                author,
                path,
                date: None,
            };
            let created =
                folio::commands::new::create_document(&site, &title, &layout, &options)?;
            println!("Created: {}", created.display());
        }

        Commands::List { r#type, json } => {
            let site = folio::Site::new(&base_dir)?;
            folio::commands::list::run(&site, &r#type, json)?;
        }

        Commands::Show { id, html } => {
            let site = folio::Site::new(&base_dir)?;
            folio::commands::show::run(&site, &id, html)?;
        }

        Commands::Check { strict, watch } => {
            if watch {
                if let Err(e) = folio::Site::new(&base_dir)
                    .and_then(|site| folio::commands::check::report(&site, strict))
                {
                    tracing::error!("{}", e);
                }
                folio::commands::check::watch(base_dir, strict).await?;
            } else {
                let site = folio::Site::new(&base_dir)?;
                folio::commands::check::report(&site, strict)?;
            }
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
