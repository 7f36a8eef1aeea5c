use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use levelr::api::{self, AppState};
use levelr::config::{McpArgs, ServeArgs};
use levelr::generation::{LevelPlanner, QuotaTracker};
use levelr::mcp;

#[derive(Parser)]
#[command(name = "levelr")]
#[command(about = "Gamified goal tracking with AI-generated level plans")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server (the default)
    Serve(ServeArgs),
    /// Start MCP server via stdio
    Mcp(McpArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stderr keeps stdout free for the MCP transport
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "levelr=debug,levelr_core=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve(cli.serve)) {
        Commands::Serve(args) => serve(args).await?,
        Commands::Mcp(args) => {
            let db = args.store.open()?;
            mcp::run_stdio_server(db).await?;
        }
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let addr = args.bind_addr();
    tracing::info!("Starting Levelr server on {}", addr);

    let db = args.store.open()?;
    let planner = LevelPlanner::new(args.gemini.backend()?, QuotaTracker::default());
    let app = api::create_router(AppState::new(db, planner));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Levelr server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
