//! CLI entry point for helios

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helios::content::NewPost;

#[derive(Parser)]
#[command(name = "helios")]
#[command(version)]
#[command(about = "A minimalist blog platform for focused writing", long_about = None)]
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

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Short summary shown in post lists
        #[arg(long, default_value = "")]
        description: String,

        /// Publication date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Featured image URL
        #[arg(long, default_value = "")]
        image: String,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// Category
        #[arg(long, default_value = "")]
        category: String,

        /// Markdown body
        #[arg(long, default_value = "")]
        content: String,

        /// Print the document instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, draft, category, tag)
        #[arg(default_value = "post")]
        r#type: String,

        /// Only posts whose title or description contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "helios=debug,info"
    } else {
        "helios=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
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
            tracing::info!("Initializing Helios site in {:?}", target_dir);
            helios::commands::init::init_site(&target_dir)?;
            println!("Initialized Helios site in {:?}", target_dir);
        }

        Commands::New {
            title,
            description,
            date,
            image,
            tags,
            category,
            content,
            stdout,
        } => {
            let mut post = NewPost::new(title);
            post.description = description;
            if let Some(date) = date {
                post.date = date;
            }
            post.featured_image = image;
            post.tags = tags;
            post.category = category;
            post.content = content;

            if stdout {
                print!("{}", post.to_markdown());
            } else {
                let app = helios::Helios::new(&base_dir)?;
                let path = helios::commands::new::create_post(&app, &post)?;
                println!("Created: {:?}", path);
            }
        }

        Commands::Generate { watch } => {
            let app = helios::Helios::new(&base_dir)?;
            tracing::info!("Generating static files...");

            let stats = app.generate()?;
            println!(
                "Generated {} posts, {} pages, {} categories and {} tags",
                stats.posts, stats.pages, stats.categories, stats.tags
            );

            if watch {
                tracing::info!("Watching for file changes...");
                tokio::task::spawn_blocking(move || helios::commands::generate::watch(&app))
                    .await??;
            }
        }

        Commands::Server { port, ip, r#static } => {
            let app = helios::Helios::new(&base_dir)?;

            // Generate first
            tracing::info!("Generating static files...");
            app.generate()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            helios::server::start(&app, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            let app = helios::Helios::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            app.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List {
            r#type,
            search,
            json,
        } => {
            let app = helios::Helios::new(&base_dir)?;
            helios::commands::list::run(&app, &r#type, search.as_deref(), json)?;
        }

        Commands::Version => {
            println!("helios version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
