//! Background fetch workers
//!
//! The session owner never blocks on the network. Jobs go in over a
//! `crossbeam-channel` queue shared by a small pool of threads; each thread
//! resolves its job through the shared [`RequestCache`] (so identical keys in
//! flight on two threads still fetch once) and sends a [`FetchOutcome`] back.
//!
//! Outcomes carry the key they were requested for. Deciding whether an
//! outcome still matters is the receiver's job.

use crate::api::Transport;
use crate::cache::{QueryState, RequestCache};
use crate::query::{GraphQlRequest, RequestKey};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One request to run in the background
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub key: RequestKey,
    pub request: GraphQlRequest,
}

/// Settled result of a [`FetchJob`]
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub key: RequestKey,
    pub state: QueryState,
}

/// Pool of fetch threads
pub struct FetchWorker {
    jobs: Option<Sender<FetchJob>>,
    outcomes: Receiver<FetchOutcome>,
    handles: Vec<JoinHandle<()>>,
}

impl FetchWorker {
    /// Spawn `threads` workers (at least one)
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a thread cannot be spawned.
    pub fn spawn(
        transport: Arc<dyn Transport>,
        cache: Arc<RequestCache>,
        threads: usize,
    ) -> io::Result<Self> {
        let (job_tx, job_rx) = unbounded::<FetchJob>();
        let (outcome_tx, outcome_rx) = unbounded::<FetchOutcome>();

        let handles = (0..threads.max(1))
            .map(|index| {
                let jobs = job_rx.clone();
                let outcomes = outcome_tx.clone();
                let transport = Arc::clone(&transport);
                let cache = Arc::clone(&cache);
                thread::Builder::new()
                    .name(format!("reposcout-fetch-{index}"))
                    .spawn(move || worker_loop(&jobs, &outcomes, transport.as_ref(), &cache))
            })
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self {
            jobs: Some(job_tx),
            outcomes: outcome_rx,
            handles,
        })
    }

    /// Queue a job; returns `false` if the workers are gone
    pub fn submit(&self, job: FetchJob) -> bool {
        self.jobs
            .as_ref()
            .is_some_and(|jobs| jobs.send(job).is_ok())
    }

    /// Next outcome if one is ready
    #[must_use]
    pub fn try_recv(&self) -> Option<FetchOutcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next outcome
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchOutcome> {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        // Closing the job queue ends every worker loop
        drop(self.jobs.take());
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    jobs: &Receiver<FetchJob>,
    outcomes: &Sender<FetchOutcome>,
    transport: &dyn Transport,
    cache: &RequestCache,
) {
    for job in jobs {
        tracing::debug!(key = %job.key, "dispatching fetch");
        let state = cache.resolve(&job.key, || transport.execute(&job.request));
        if outcomes.send(FetchOutcome { key: job.key, state }).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Pagination, QueryBuilder, SearchQuery, SortState};
    use crate::testing::{ScriptedTransport, connection};

    fn job(term: &str) -> FetchJob {
        let query = SearchQuery::new(term, Pagination::first_page(10).unwrap(), SortState::default());
        FetchJob {
            key: RequestKey::from_query(&query),
            request: QueryBuilder::default().build(&query),
        }
    }

    #[test]
    fn test_outcome_carries_key() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(connection(&[("A", 1, 1)], false, false)));
        let cache = Arc::new(RequestCache::default());
        let worker = FetchWorker::spawn(transport.clone(), cache, 1).unwrap();

        let job = job("react");
        let key = job.key.clone();
        assert!(worker.submit(job));

        let outcome = worker.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.key, key);
        assert!(outcome.state.data().is_some());
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_error_outcome() {
        let transport = Arc::new(ScriptedTransport::new());
        let cache = Arc::new(RequestCache::default());
        let worker = FetchWorker::spawn(transport, cache, 2).unwrap();

        assert!(worker.submit(job("react")));
        let outcome = worker.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(outcome.state.error().is_some());
    }

    #[test]
    fn test_try_recv_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        let worker = FetchWorker::spawn(transport, Arc::new(RequestCache::default()), 1).unwrap();
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_drop_joins_threads() {
        let transport = Arc::new(ScriptedTransport::new());
        let worker = FetchWorker::spawn(transport, Arc::new(RequestCache::default()), 3).unwrap();
        drop(worker);
    }
}
