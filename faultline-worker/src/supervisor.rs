//! Worker pool supervision
//!
//! Spawns the workers staggered in time, parks until the stop flag is
//! set, then joins every worker under a bounded timeout. Shutdown is
//! best-effort: stragglers are logged and abandoned, never waited on
//! forever.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use faultline_config::LoadConfig;
use faultline_db::Connector;
use faultline_resilience::ShutdownCoordinator;

use crate::worker::Worker;

pub struct Supervisor<C: Connector> {
    connector: Arc<C>,
    load: Arc<LoadConfig>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl<C: Connector> Supervisor<C> {
    pub fn new(connector: C, load: LoadConfig, shutdown: Arc<ShutdownCoordinator>) -> Self {
        Self {
            connector: Arc::new(connector),
            load: Arc::new(load),
            shutdown,
        }
    }

    /// Run the pool until the stop flag is set, then drain it.
    pub async fn run(&self) {
        let handles = self.spawn_workers().await;
        info!(workers = handles.len(), "all workers started, running until stop signal");

        self.shutdown.wait().await;

        self.join_workers(handles).await;
    }

    async fn spawn_workers(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.load.workers);
        for id in 1..=self.load.workers {
            let worker = Worker::new(
                id,
                Arc::clone(&self.connector),
                Arc::clone(&self.load),
                Arc::clone(&self.shutdown),
            );
            handles.push(tokio::spawn(worker.run()));
            // Staggered starts avoid a connection stampede.
            sleep(self.load.spawn_stagger).await;
        }
        handles
    }

    async fn join_workers(&self, handles: Vec<JoinHandle<()>>) {
        // Must outlive the longest legitimate in-flight statement.
        let deadline = self.load.join_timeout();
        info!("waiting for workers to finish");

        for (index, handle) in handles.into_iter().enumerate() {
            let id = index + 1;
            match timeout(deadline, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(worker = id, error = %err, "worker terminated abnormally"),
                Err(_) => warn!(worker = id, timeout = ?deadline, "worker did not stop within timeout"),
            }
        }
        info!("worker pool shut down");
    }
}
