//! Headless API server entrypoint.

use agencydesk_core::config::env_flag_enabled;
use agencydesk_core::db::TransactionOps;
use agencydesk_core::DEFAULT_PORT;
use agencydesk_server::{serve_router, AppState, Config, Database, Services};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    reconcile: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--reconcile" => flags.reconcile = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

fn runs_maintenance_mode(flags: CliFlags) -> bool {
    flags.reconcile
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agencydesk=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();

    if cli_flags.reconcile {
        run_reconcile(&config)?;
    }

    if runs_maintenance_mode(cli_flags) {
        return Ok(());
    }

    let services = Services::from_config(&config)?;
    let state = AppState::new(config.clone(), services);

    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = agencydesk_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("AgencyDesk running at http://{}", actual_addr);

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("AgencyDesk stopped");

    Ok(())
}

fn print_help() {
    println!("AgencyDesk Server\n");
    println!("Usage: agencydesk [OPTIONS]\n");
    println!("Options:");
    println!("  --reconcile       Recount folder item counts and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database path (default: ~/.cache/agencydesk/db)");
    println!("  STORAGE_PATH      Uploaded file root (default: ~/.cache/agencydesk/objects)");
    println!("  PUBLIC_BASE_URL   Base URL prefixed to stored object keys");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  MAX_UPLOAD_SIZE   Maximum upload size in bytes (default: 25MB)");
    println!("  STORAGE_QUOTA_BYTES  Total bytes the object store may hold");
    println!("  CALENDAR_WEBHOOK_URL  Calendar busy-time endpoint for the booking widget");
    println!("  EMAIL_WEBHOOK_URL     Relay for booking and contact notifications");
    println!("  PROMO_CODES       Comma list of CODE:PERCENT promo codes");
    println!("  BUSINESS_HOURS    Booking window in UTC, e.g. '09:00-17:00/30'");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

fn run_reconcile(config: &Config) -> anyhow::Result<()> {
    if !std::path::Path::new(&config.db_path).exists() {
        println!("No existing database to reconcile");
        return Ok(());
    }
    // Opening repairs drifted counts; the second pass confirms nothing is left.
    let database = Database::new(&config.db_path)?;
    let remaining = TransactionOps::reconcile_folder_counts(&database)?;
    if remaining == 0 {
        println!("Folder item counts match stored files");
    } else {
        println!("Corrected {} more folder count(s)", remaining);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
