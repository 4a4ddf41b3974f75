//! CLI `status` command: probe the worker and print a health report.

use anyhow::Result;

use membridge::config::BridgeConfig;
use membridge::project::current_project;
use membridge::worker::WorkerClient;

/// Probe health and readiness and print a report. Never fails on an unreachable worker.
pub async fn status(config: &BridgeConfig) -> Result<()> {
    let client = WorkerClient::new(&config.worker)?;

    let health = client.check_health().await;
    let ready = client.readiness_check().await;

    println!("Memory Bridge Status");
    println!("====================");
    println!();
    println!("Worker URL:        {}", client.base_url());
    println!("Port:              {}", client.port());
    println!("Project:           {}", current_project());
    println!();
    println!("Health:");
    println!("  Status:          {}", health.status.as_deref().unwrap_or("(not reported)"));
    println!("  Version:         {}", health.version.as_deref().unwrap_or("(not reported)"));
    println!("  API version:     {}", health.api_version.as_deref().unwrap_or("(not reported)"));
    println!("Readiness:         {}", if ready { "READY" } else { "NOT READY" });

    if !health.is_ok() || !ready {
        println!();
        println!("Memory features will run in degraded mode.");
        println!("  1. Check that the worker is running on {}", client.base_url());
        println!("  2. Or point the bridge elsewhere: MEMBRIDGE_WORKER_URL=http://host:port");
    }

    Ok(())
}
