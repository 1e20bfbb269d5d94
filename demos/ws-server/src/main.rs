use std::time::Duration;

use clap::Parser;
use noughts::prelude::*;
use noughts::setup_logging;

/// Real-time tic-tac-toe over WebSockets.
#[derive(Parser, Debug)]
#[command(name = "noughts-server")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "NOUGHTS_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Shared secret for HS256 access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit one JSON object per log event
    #[arg(long)]
    json_logs: bool,

    /// Seconds between keepalive pings
    #[arg(long, default_value_t = 20)]
    ping_secs: u64,

    /// Seconds of silence before a connection is dropped
    #[arg(long, default_value_t = 60)]
    idle_secs: u64,

    /// Frames a slow connection may have queued before it is dropped
    #[arg(long, default_value_t = noughts::DEFAULT_OUTBOUND_CAPACITY)]
    outbound_capacity: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_logging(&args.log_level, args.json_logs)?;

    if args.idle_secs <= args.ping_secs {
        tracing::warn!(
            ping_secs = args.ping_secs,
            idle_secs = args.idle_secs,
            "idle timeout is not longer than the ping interval"
        );
    }

    let server = NoughtsServerBuilder::new()
        .bind(&args.bind)
        .ping_interval(Duration::from_secs(args.ping_secs))
        .idle_timeout(Duration::from_secs(args.idle_secs))
        .outbound_capacity(args.outbound_capacity)
        .build(JwtVerifier::new(args.jwt_secret.as_bytes()))
        .await?;
    tracing::info!(addr = %args.bind, "starting noughts server");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}
