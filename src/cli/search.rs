use anyhow::Result;

use membridge::config::BridgeConfig;
use membridge::worker::{SearchOptions, WorkerClient};

/// Run a memory search from the terminal.
pub async fn search(config: &BridgeConfig, query: &str, options: &SearchOptions) -> Result<()> {
    let client = WorkerClient::new(&config.worker)?;
    let response = client.search(query, options).await?;

    if response.results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!(
        "Found {} result(s), showing {}\n",
        response.total,
        response.results.len()
    );

    for (i, result) in response.results.iter().enumerate() {
        let id = result.get("id").map(|v| v.to_string()).unwrap_or_else(|| "?".into());
        let tool = result
            .get("toolName")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        let summary = result
            .get("summary")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| result.to_string());
        let preview: String = if summary.chars().count() > 120 {
            format!("{}...", summary.chars().take(120).collect::<String>())
        } else {
            summary
        };

        println!("  {}. [{}] #{}", i + 1, tool, id);
        println!("     {}", preview);
        println!();
    }

    Ok(())
}
