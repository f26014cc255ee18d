use macro_dashboard_lib::config::DashboardConfig;
use macro_dashboard_lib::core::orchestrator::Orchestrator;
use macro_dashboard_lib::core::scheduler::summarize;
use macro_dashboard_lib::init_tracing;

/// Runs one refresh cycle against the live providers and prints the batch.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = DashboardConfig::from_env()?;
    let specs = config.load_indicators()?;
    println!("Refreshing {} indicators...", specs.len());

    let mut orchestrator = Orchestrator::from_config(&config);
    let batch = orchestrator.refresh_all(&specs).await;

    let summary = summarize(&batch);
    let ok = summary.get(&true).map(Vec::len).unwrap_or(0);
    println!("Updated: {}", ok);
    if let Some(failed) = summary.get(&false) {
        println!("Unavailable ({}): {}", failed.len(), failed.join(", "));
    }

    if std::env::args().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        for (key, update) in &batch {
            let returns: Vec<String> = update
                .returns
                .iter()
                .flat_map(|set| set.iter())
                .map(|(period, value)| format!("{} {:+.2}", period.label(), value))
                .collect();
            println!(
                "  {:<22} {:>12.2}  {:<28} {}",
                key,
                update.current,
                update.change_label,
                returns.join("  ")
            );
        }
    }

    Ok(())
}
