use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use vitrine::{
    AppState, Config, admin, blog::PostRepository, create_app, reviews, startup_checks, store,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Inspect posts from both content sources
    #[command(subcommand)]
    Posts(PostsCommands),

    /// Inspect stored categories
    #[command(subcommand)]
    Categories(CategoriesCommands),

    /// Print the SHA-256 to put in `[admin] password_sha256`
    HashPassword {
        password: String,
    },
}

#[derive(Subcommand, Debug)]
enum PostsCommands {
    /// List every post, drafts included
    List,
}

#[derive(Subcommand, Debug)]
enum CategoriesCommands {
    /// List categories by name
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Serve {
            port,
            host,
            quit_after,
        }) => run_server(&cli.config, port, host, quit_after).await,
        Some(Commands::Posts(PostsCommands::List)) => list_posts(&cli.config).await,
        Some(Commands::Categories(CategoriesCommands::List)) => {
            list_categories(&cli.config).await
        }
        Some(Commands::HashPassword { password }) => {
            println!("{}", admin::hash_password(&password));
            Ok(())
        }
        None => run_server(&cli.config, None, None, None).await,
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        Ok(toml_edit::de::from_str::<Config>(&config_content)?)
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

async fn list_posts(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let repository = PostRepository::new(store::create_store(&config.database).await?);

    let library = reviews::ReviewsLibrary::new(config.reviews.clone());
    library.refresh_reviews().await?;

    let posts = repository.get_posts(false).await;
    let files = library.list_reviews().await;
    if posts.is_empty() && files.is_empty() {
        println!("No posts found");
        return Ok(());
    }

    for post in &posts {
        println!(
            "  [database] {:<40} {:<10?} {}",
            post.slug, post.status, post.title
        );
    }
    for review in &files {
        println!("  [file]     {:<40} {:<10} {}", review.slug, "-", review.title);
    }
    Ok(())
}

async fn list_categories(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let repository = PostRepository::new(store::create_store(&config.database).await?);

    let categories = repository.get_categories().await;
    if categories.is_empty() {
        println!("No categories found");
    }
    for category in categories {
        println!("  {:<30} {}", category.slug, category.name);
    }
    Ok(())
}

async fn run_server(
    config_path: &Path,
    port: Option<u16>,
    host: Option<String>,
    quit_after: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting {} server", config.app.name);
    info!("Configuration loaded from: {:?}", config_path);
    info!("Template directory: {:?}", config.templates.directory);
    info!(
        "Static files directory: {:?}",
        config.static_files.directory
    );
    info!(
        "Reviews directory: {:?}",
        config.reviews.source_directory
    );

    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                tracing::error!("Startup check failed: {}", error);
            }
            if errors.iter().any(startup_checks::StartupCheckError::is_critical) {
                tracing::error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            } else {
                tracing::warn!("Non-critical startup checks failed, continuing");
            }
        }
    }

    let document_store = store::create_store(&config.database).await?;
    info!("Using {}", document_store.name());

    let refresh_interval = config.reviews.refresh_interval_minutes;
    let app_state = AppState::new(config, document_store).await;

    if let Some(interval_minutes) = refresh_interval
        && interval_minutes > 0
    {
        info!(
            "Starting background reviews refresh every {} minutes",
            interval_minutes
        );
        reviews::ReviewsLibrary::start_background_refresh(
            app_state.reviews.clone(),
            interval_minutes,
        );
    }

    let app = create_app(app_state);

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}
