use clap::Parser;
use code_runner_server::{create_app, run_server};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:5000")]
    addr: SocketAddr,

    /// Directory under which scratch files are created
    #[arg(short, long, default_value = "./workspace")]
    workspace_dir: PathBuf,

    /// Wall-clock ceiling for one execution, in seconds
    #[arg(short, long, default_value = "30")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let app = create_app(args.workspace_dir, Duration::from_secs(args.timeout_secs));
    run_server(app, args.addr).await?;

    Ok(())
}
