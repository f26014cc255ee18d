use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::core::orchestrator::{Orchestrator, UpdateBatch};
use crate::indicators::IndicatorSpec;
use crate::models::IndicatorUpdate;

/// Receives each completed batch.
pub trait UpdateSink: Send + Sync {
    fn publish(&self, batch: &UpdateBatch);
}

/// Keeps the most recent batch. A new batch replaces the previous one whole.
#[derive(Debug, Default)]
pub struct LatestUpdates {
    inner: RwLock<UpdateBatch>,
}

impl LatestUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UpdateBatch {
        self.inner.read().map(|batch| batch.clone()).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<IndicatorUpdate> {
        self.inner.read().ok().and_then(|batch| batch.get(key).cloned())
    }
}

impl UpdateSink for LatestUpdates {
    fn publish(&self, batch: &UpdateBatch) {
        match self.inner.write() {
            Ok(mut current) => *current = batch.clone(),
            Err(e) => error!("update store poisoned: {}", e),
        }
    }
}

/// One full refresh, published to the sink. Returns `(updated, unavailable)`.
pub async fn run_cycle(
    orchestrator: &Mutex<Orchestrator>,
    specs: &[IndicatorSpec],
    sink: &dyn UpdateSink,
) -> (usize, usize) {
    let batch = orchestrator.lock().await.refresh_all(specs).await;
    let failed = batch.values().filter(|u| u.is_error()).count();
    sink.publish(&batch);
    (batch.len() - failed, failed)
}

/// Starts the recurring refresh job plus one startup refresh.
pub async fn init(
    orchestrator: Arc<Mutex<Orchestrator>>,
    specs: Vec<IndicatorSpec>,
    sink: Arc<dyn UpdateSink>,
    cron: &str,
) -> Result<JobScheduler, anyhow::Error> {
    let sched = JobScheduler::new().await?;
    let specs = Arc::new(specs);

    let job_orch = Arc::clone(&orchestrator);
    let job_specs = Arc::clone(&specs);
    let job_sink = Arc::clone(&sink);
    sched
        .add(Job::new_async(cron, move |_uuid, _l| {
            let orch = Arc::clone(&job_orch);
            let specs = Arc::clone(&job_specs);
            let sink = Arc::clone(&job_sink);
            Box::pin(async move {
                info!("Running scheduled refresh");
                let (ok, failed) = run_cycle(&orch, &specs, sink.as_ref()).await;
                info!(updated = ok, unavailable = failed, "Scheduled refresh finished");
            })
        })?)
        .await?;

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        info!("Running startup refresh");
        let (ok, failed) = run_cycle(&orchestrator, &specs, sink.as_ref()).await;
        info!(updated = ok, unavailable = failed, "Startup refresh finished");
    });

    sched.start().await?;
    Ok(sched)
}

/// Indicator keys grouped by whether their last update succeeded.
pub fn summarize(batch: &UpdateBatch) -> BTreeMap<bool, Vec<String>> {
    let mut out: BTreeMap<bool, Vec<String>> = BTreeMap::new();
    for (key, update) in batch {
        out.entry(!update.is_error()).or_default().push(key.clone());
    }
    out
}
