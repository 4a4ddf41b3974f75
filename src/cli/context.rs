use std::sync::Arc;

use anyhow::Result;

use membridge::config::BridgeConfig;
use membridge::context::ContextInjector;
use membridge::project::current_project;
use membridge::worker::WorkerClient;

/// Print the system-prompt addition for a project (defaults to the current directory).
pub async fn context(config: &BridgeConfig, project: Option<&str>) -> Result<()> {
    let client = Arc::new(WorkerClient::new(&config.worker)?);
    let injector = ContextInjector::new(client);

    let project = project.map_or_else(current_project, str::to_string);
    let addition = injector.system_prompt_addition(&project).await;

    if addition.is_empty() {
        println!("No memory context for project '{project}'.");
    } else {
        println!("{addition}");
    }
    Ok(())
}
