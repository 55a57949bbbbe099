//! Utility functions.

use tracing::{info, warn};

/// Resolve when the process receives Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Parse a path id the way a JavaScript `Number()` cast would accept it.
///
/// Integral values such as `"3"`, `" 3 "` or `"3.0"` resolve; anything
/// negative, fractional, or non-numeric yields `None`.
pub fn parse_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<u64>() {
        return Some(id);
    }

    let value: f64 = trimmed.parse().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}
