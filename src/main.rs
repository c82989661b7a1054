use aws_config::BehaviorVersion;
use s3loader::{catalog::GlueCatalog, fetch::S3Store, load::MySqlDatabase, pipeline, Config};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// `EX_CONFIG` from sysexits.h.
const EXIT_CONFIG: u8 = 78;

#[tokio::main]
async fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) resolve configuration once ───────────────────────────────
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    info!(
        bucket = %config.source.bucket,
        key = %config.source.key,
        table = %config.database.table,
        "configuration loaded"
    );

    // ─── 3) build collaborators ──────────────────────────────────────
    let sdk = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = S3Store::new(&sdk);
    let database = MySqlDatabase::new(&config.database);
    let catalog = GlueCatalog::new(&sdk);

    // ─── 4) fetch → load → fallback ──────────────────────────────────
    let outcome = pipeline::run(&config, &store, &database, &catalog).await;
    let code = outcome.exit_code();
    info!(exit_code = code, "all done");

    ExitCode::from(code)
}
