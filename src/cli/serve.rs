//! CLI `serve` command: bridge newline-delimited host events from stdin.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use membridge::bridge::{ChannelBus, EventEnvelope};
use membridge::config::BridgeConfig;
use membridge::integration::MemoryIntegration;

/// Read `{"type": ..., "properties": ...}` lines from stdin until EOF or ctrl-c.
///
/// Malformed lines and unhandled event kinds are logged and skipped.
pub async fn serve(config: BridgeConfig) -> Result<()> {
    let bus = ChannelBus::new();
    let mut integration = MemoryIntegration::new(config)?;
    integration.initialize(Some(&bus)).await;

    if !integration.is_memory_available() {
        tracing::warn!("continuing without memory capture");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no: u64 = 0;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping");
                break;
            }
        };
        let Some(line) = line else {
            tracing::info!("host event stream ended");
            break;
        };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        match EventEnvelope::parse_line(&line) {
            Ok(Some(event)) => {
                if integration.is_bound() {
                    bus.publish(event);
                }
            }
            Ok(None) => tracing::debug!(line = line_no, "ignoring unhandled event kind"),
            Err(e) => tracing::warn!(line = line_no, error = %e, "skipping malformed event"),
        }
    }

    bus.close();
    integration.drain().await;
    integration.shutdown();
    Ok(())
}
