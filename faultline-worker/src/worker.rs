//! Per-worker connection lifecycle state machine
//!
//! A worker owns at most one live session, issues a randomized mix of
//! short probes and long blocking statements, and reconnects with
//! exponential backoff when the server drops it. Every failure class
//! below fatal stays inside the worker; its only outputs are log lines
//! and task termination.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};

use faultline_config::LoadConfig;
use faultline_db::mysql::{long_query, SHORT_QUERY};
use faultline_db::{Connector, DbError, Session};
use faultline_resilience::{apply_jitter, ReconnectBackoff, ShutdownCoordinator};

/// Pause after a connection-lost classification, before reconnecting.
const RECONNECT_PAUSE: Duration = Duration::from_secs(1);
/// Pause after a statement-level failure that keeps the session.
const QUERY_RETRY_PAUSE: Duration = Duration::from_secs(2);
/// Cooldown after an error the adapter could not classify.
const UNEXPECTED_PAUSE: Duration = Duration::from_secs(5);

/// One simulated application user.
pub struct Worker<C: Connector> {
    id: usize,
    connector: Arc<C>,
    load: Arc<LoadConfig>,
    shutdown: Arc<ShutdownCoordinator>,
    backoff: ReconnectBackoff,
    rng: StdRng,
}

enum QueryOutcome {
    Completed,
    ConnectionLost,
    RetryInPlace,
    Unexpected,
}

impl<C: Connector> Worker<C> {
    pub fn new(
        id: usize,
        connector: Arc<C>,
        load: Arc<LoadConfig>,
        shutdown: Arc<ShutdownCoordinator>,
    ) -> Self {
        Self {
            id,
            connector,
            load,
            shutdown,
            backoff: ReconnectBackoff::default(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Drive the connect/query/pace loop until the stop flag is observed.
    ///
    /// The flag is checked only at the top of the loop; an in-flight
    /// statement always runs to completion first.
    pub async fn run(mut self) {
        let span = info_span!("worker", id = self.id);
        async move {
            info!("worker started");
            let mut session: Option<C::Session> = None;

            while !self.shutdown.is_triggered() {
                // Establish a session if the previous one is gone or dead
                let mut live = match session.take().filter(|s| s.is_alive()) {
                    Some(live) => live,
                    None => match self.connect().await {
                        Some(live) => live,
                        None => continue,
                    },
                };

                match self.run_query(&mut live).await {
                    QueryOutcome::Completed => {
                        let pace = apply_jitter(self.load.short_query_interval, &mut self.rng);
                        session = Some(live);
                        sleep(pace).await;
                    }
                    QueryOutcome::ConnectionLost => {
                        live.close().await;
                        sleep(RECONNECT_PAUSE).await;
                    }
                    QueryOutcome::RetryInPlace => {
                        session = Some(live);
                        sleep(QUERY_RETRY_PAUSE).await;
                    }
                    QueryOutcome::Unexpected => {
                        live.close().await;
                        sleep(UNEXPECTED_PAUSE).await;
                    }
                }
            }

            if let Some(mut live) = session {
                info!("closing connection");
                live.close().await;
            }
            info!("worker stopped");
        }
        .instrument(span)
        .await
    }

    /// One connect attempt. On failure sleeps the current backoff delay
    /// and leaves the worker disconnected.
    async fn connect(&mut self) -> Option<C::Session> {
        info!("attempting to connect");
        match self.connector.connect().await {
            Ok(session) => {
                self.backoff.reset();
                match session.id() {
                    Some(id) => info!(connection_id = id, "connection established"),
                    None => info!("connection established"),
                }
                Some(session)
            }
            Err(err) => {
                let delay = self.backoff.next_delay();
                error!(error = %err, retry_in = ?delay, "connect failed");
                sleep(delay).await;
                None
            }
        }
    }

    async fn run_query(&mut self, session: &mut C::Session) -> QueryOutcome {
        let long = draw_long_query(&mut self.rng, self.load.long_query_chance);

        let started = Instant::now();
        let result = if long {
            let sql = long_query(self.load.long_query_duration);
            info!(query = %sql, "executing long query");
            session.execute(&sql).await
        } else {
            session.execute(SHORT_QUERY).await
        };

        match result {
            Ok(()) => {
                if long {
                    info!(elapsed = ?started.elapsed(), "long query completed");
                } else {
                    debug!(elapsed = ?started.elapsed(), "short query completed");
                }
                QueryOutcome::Completed
            }
            Err(err @ DbError::ConnectionLost(_)) => {
                warn!(error = %err, "connection likely lost, reconnecting");
                QueryOutcome::ConnectionLost
            }
            Err(err @ DbError::Query(_)) => {
                error!(error = %err, "query failed, retrying on same session");
                QueryOutcome::RetryInPlace
            }
            Err(err) => {
                error!(error = ?err, "unexpected error in worker loop");
                QueryOutcome::Unexpected
            }
        }
    }
}

/// Decide whether the next statement is the long blocker.
pub(crate) fn draw_long_query<R: Rng>(rng: &mut R, chance: f64) -> bool {
    rng.random::<f64>() < chance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_never_long_at_zero_chance() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..10_000).all(|_| !draw_long_query(&mut rng, 0.0)));
    }

    #[test]
    fn test_draw_always_long_at_full_chance() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!((0..10_000).all(|_| draw_long_query(&mut rng, 1.0)));
    }

    #[test]
    fn test_draw_converges_to_chance() {
        let mut rng = StdRng::seed_from_u64(3);
        let chance = 0.1;
        let draws = 10_000;
        let long = (0..draws)
            .filter(|_| draw_long_query(&mut rng, chance))
            .count();

        let observed = long as f64 / draws as f64;
        assert!(
            (observed - chance).abs() < 0.05,
            "observed {} for chance {}",
            observed,
            chance
        );
    }
}
