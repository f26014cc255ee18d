use macro_dashboard_lib::config::DashboardConfig;
use macro_dashboard_lib::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = DashboardConfig::from_env()?;
    run(config).await
}
