//! Scripted connector/session fakes for worker and supervisor tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use faultline_db::{Connector, DbError, Session};

/// Scripted outcome for one execute call.
#[derive(Clone, Debug)]
pub enum Step {
    Ok,
    /// Succeed after holding the statement open for the given duration.
    SlowOk(Duration),
    ConnectionLost,
    QueryError,
    Unexpected,
}

/// Shared state behind the fake connector. Scripts are consumed
/// front-to-front; an exhausted script means "succeed".
#[derive(Default)]
pub struct FakeEndpoint {
    /// Outcomes for connect attempts; true = success.
    connects: Mutex<VecDeque<bool>>,
    /// Outcomes for execute calls, across all sessions.
    steps: Mutex<VecDeque<Step>>,

    pub connect_attempts: AtomicUsize,
    pub query_attempts: AtomicUsize,
    pub live_sessions: AtomicUsize,
    pub max_live_sessions: AtomicUsize,
    next_session_id: AtomicUsize,

    pub connect_times: Mutex<Vec<Instant>>,
    pub closed_sessions: Mutex<Vec<u64>>,
    pub queries_per_session: Mutex<HashMap<u64, usize>>,
}

impl FakeEndpoint {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_connects(&self, outcomes: impl IntoIterator<Item = bool>) {
        self.connects.lock().unwrap().extend(outcomes);
    }

    pub fn script_queries(&self, steps: impl IntoIterator<Item = Step>) {
        self.steps.lock().unwrap().extend(steps);
    }

    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn query_attempts(&self) -> usize {
        self.query_attempts.load(Ordering::SeqCst)
    }

    pub fn max_live_sessions(&self) -> usize {
        self.max_live_sessions.load(Ordering::SeqCst)
    }

    pub fn connect_times(&self) -> Vec<Instant> {
        self.connect_times.lock().unwrap().clone()
    }

    pub fn closed_sessions(&self) -> Vec<u64> {
        self.closed_sessions.lock().unwrap().clone()
    }

    pub fn queries_for_session(&self, id: u64) -> usize {
        self.queries_per_session
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or(0)
    }
}

/// Connector handle cloned into each worker.
#[derive(Clone)]
pub struct FakeConnector(pub Arc<FakeEndpoint>);

#[async_trait]
impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self) -> Result<FakeSession, DbError> {
        let endpoint = &self.0;
        endpoint.connect_times.lock().unwrap().push(Instant::now());
        endpoint.connect_attempts.fetch_add(1, Ordering::SeqCst);

        let ok = endpoint.connects.lock().unwrap().pop_front().unwrap_or(true);
        tokio::task::yield_now().await;
        if !ok {
            return Err(DbError::Connect("Connection refused".to_string()));
        }

        let id = endpoint.next_session_id.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        let live = endpoint.live_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        endpoint.max_live_sessions.fetch_max(live, Ordering::SeqCst);

        Ok(FakeSession {
            endpoint: Arc::clone(endpoint),
            id,
            alive: true,
        })
    }
}

pub struct FakeSession {
    endpoint: Arc<FakeEndpoint>,
    id: u64,
    alive: bool,
}

#[async_trait]
impl Session for FakeSession {
    fn id(&self) -> Option<u64> {
        Some(self.id)
    }

    async fn execute(&mut self, _sql: &str) -> Result<(), DbError> {
        self.endpoint.query_attempts.fetch_add(1, Ordering::SeqCst);
        let step = self
            .endpoint
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::Ok);
        tokio::task::yield_now().await;

        match step {
            Step::Ok => {
                self.record_success();
                Ok(())
            }
            Step::SlowOk(duration) => {
                tokio::time::sleep(duration).await;
                self.record_success();
                Ok(())
            }
            Step::ConnectionLost => {
                Err(DbError::ConnectionLost("server has gone away".to_string()))
            }
            Step::QueryError => Err(DbError::Query(
                "You have an error in your SQL syntax".to_string(),
            )),
            Step::Unexpected => Err(DbError::Unexpected("value decode failure".to_string())),
        }
    }

    async fn close(&mut self) {
        if self.alive {
            self.alive = false;
            self.endpoint.live_sessions.fetch_sub(1, Ordering::SeqCst);
            self.endpoint.closed_sessions.lock().unwrap().push(self.id);
        }
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl FakeSession {
    fn record_success(&self) {
        *self
            .endpoint
            .queries_per_session
            .lock()
            .unwrap()
            .entry(self.id)
            .or_insert(0) += 1;
    }
}
