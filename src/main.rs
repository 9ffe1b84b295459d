use anyhow::Context;
use clap::Parser;
use courselib_kernel::{settings::Settings, InitCtx};

/// Course library REST API
#[derive(Debug, Parser)]
#[command(name = "courselib", version, about)]
struct Args {
    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,

    /// Load the sample authors and courses on startup
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load().with_context(|| "failed to load course library settings")?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if args.seed {
        settings.database.seed = true;
    }

    courselib_telemetry::init(&settings.telemetry).context("failed to initialize telemetry")?;

    tracing::info!(
        env = ?settings.environment,
        seed = settings.database.seed,
        "courselib bootstrap starting"
    );

    let registry = courselib_app::build_registry(courselib_app::in_memory_store());
    let ctx = InitCtx {
        settings: &settings,
    };
    registry.boot(&ctx).await?;

    tracing::info!("courselib bootstrap complete");
    let served = courselib_http::start_server(&registry, &settings).await;

    registry.shutdown().await?;
    served
}
