use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_channel::Receiver;
use reqwest::Client;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cycle::Cycle;
use crate::filecache::FileCache;
use crate::request::{build_request, RequestData, RequestGenerator};
use crate::script::Chain;
use crate::stats::{ResponseData, DRY_RUN_KEY};
use crate::RunPlan;

/// Orchestrates the worker pool: dispatches "go" tokens through a bounded
/// channel, enforces the request/duration budget, and supervises
/// cancellation. Workers share only the latency sketch, the file cache and
/// the completed counter.
pub(crate) struct Runner {
    pub plan: Arc<RunPlan>,
    pub cache: Arc<FileCache>,
    pub chain: Arc<Chain>,
    pub clients: Arc<Vec<Client>>,
    pub responses: Option<Arc<ResponseData>>,
    pub counter: Arc<AtomicU64>,
}

impl Runner {
    pub async fn run(&self, cancel: CancellationToken) {
        let workers = self.plan.workers.max(1);
        let (tx, rx) = async_channel::bounded::<()>(workers as usize);

        let mut set = JoinSet::new();
        for _ in 0..workers {
            let worker = Worker {
                plan: Arc::clone(&self.plan),
                cache: Arc::clone(&self.cache),
                chain: Arc::clone(&self.chain),
                clients: Arc::clone(&self.clients),
                responses: self.responses.clone(),
                counter: Arc::clone(&self.counter),
                jobs: rx.clone(),
            };
            set.spawn(worker.run());
        }
        drop(rx);

        self.send_jobs(tx, &cancel).await;
        // The sender is dropped above, closing the channel; workers finish
        // their in-flight request and drain.

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                tracing::error!("worker task failed: {e}");
            }
        }
    }

    /// Sends tokens until the request budget is spent, the deadline fires,
    /// or the run is cancelled — whichever comes first.
    async fn send_jobs(&self, tx: async_channel::Sender<()>, cancel: &CancellationToken) {
        let deadline = self.plan.duration.map(|d| Instant::now() + d);
        let sleeper = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(sleeper);

        match self.plan.requests {
            Some(total) => {
                for _ in 0..total {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = &mut sleeper => break,
                        sent = tx.send(()) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
            None => loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = &mut sleeper => break,
                    sent = tx.send(()) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            },
        }
    }
}

struct Worker {
    plan: Arc<RunPlan>,
    cache: Arc<FileCache>,
    chain: Arc<Chain>,
    clients: Arc<Vec<Client>>,
    responses: Option<Arc<ResponseData>>,
    counter: Arc<AtomicU64>,
    jobs: Receiver<()>,
}

impl Worker {
    async fn run(self) {
        let transformer = if self.chain.is_empty() {
            None
        } else {
            // Sources are validated at build time, so this only fails on
            // resource exhaustion.
            match self.chain.new_transformer() {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::error!("script engine init failed: {e}");
                    return;
                }
            }
        };

        let mut generator =
            RequestGenerator::new(&self.plan, Arc::clone(&self.cache), transformer);
        let mut clients = Cycle::new((0..self.clients.len()).collect(), &mut rand::rng());
        let dynamic = generator.is_dynamic();

        // One specialized loop per (dry-run, stats, dynamic) combination:
        // the mode flags are never re-checked inside an iteration, which is
        // what keeps fully-static plans template-free at steady state.
        match (self.plan.dry_run, self.responses.clone(), dynamic) {
            (true, Some(responses), true) => self.dry_run_stats_dynamic(&mut generator, &responses).await,
            (true, Some(responses), false) => self.dry_run_stats_static(&mut generator, &responses).await,
            (true, None, true) => self.dry_run_no_stats_dynamic(&mut generator).await,
            (true, None, false) => self.dry_run_no_stats_static(&mut generator).await,
            (false, Some(responses), true) => {
                self.stats_dynamic(&mut generator, &mut clients, &responses).await
            }
            (false, Some(responses), false) => {
                self.stats_static(&mut generator, &mut clients, &responses).await
            }
            (false, None, true) => self.no_stats_dynamic(&mut generator, &mut clients).await,
            (false, None, false) => self.no_stats_static(&mut generator, &mut clients).await,
        }
    }

    fn bump(&self) {
        self.counter.fetch_add(1, Ordering::Relaxed);
    }

    async fn stats_dynamic(
        &self,
        generator: &mut RequestGenerator,
        clients: &mut Cycle<usize>,
        responses: &ResponseData,
    ) {
        let mut data = RequestData::default();
        while self.jobs.recv().await.is_ok() {
            if let Err(e) = generator.generate(&mut data) {
                let label = e.to_string();
                tracing::warn!("request generation failed: {label}");
                responses.add(&label, Duration::ZERO);
                self.bump();
                continue;
            }

            let client = &self.clients[*clients.next()];
            let started = Instant::now();
            let label = match build_request(client, generator.base_url(), &data) {
                Ok(request) => dispatch(client, request).await,
                Err(e) => e.to_string(),
            };
            responses.add(&label, started.elapsed());
            self.bump();
        }
    }

    async fn stats_static(
        &self,
        generator: &mut RequestGenerator,
        clients: &mut Cycle<usize>,
        responses: &ResponseData,
    ) {
        let mut data = RequestData::default();
        if let Err(e) = generator.generate(&mut data) {
            let label = e.to_string();
            tracing::warn!("request generation failed: {label}");
            while self.jobs.recv().await.is_ok() {
                responses.add(&label, Duration::ZERO);
                self.bump();
            }
            return;
        }

        let template = match build_request(&self.clients[0], generator.base_url(), &data) {
            Ok(request) => request,
            Err(e) => {
                let label = e.to_string();
                tracing::warn!("request build failed: {label}");
                while self.jobs.recv().await.is_ok() {
                    responses.add(&label, Duration::ZERO);
                    self.bump();
                }
                return;
            }
        };

        while self.jobs.recv().await.is_ok() {
            let client = &self.clients[*clients.next()];
            let started = Instant::now();
            let label = match template.try_clone() {
                Some(request) => dispatch(client, request).await,
                None => "request not cloneable".to_owned(),
            };
            responses.add(&label, started.elapsed());
            self.bump();
        }
    }

    async fn no_stats_dynamic(&self, generator: &mut RequestGenerator, clients: &mut Cycle<usize>) {
        let mut data = RequestData::default();
        while self.jobs.recv().await.is_ok() {
            if let Err(e) = generator.generate(&mut data) {
                tracing::warn!("request generation failed: {e}");
                self.bump();
                continue;
            }
            let client = &self.clients[*clients.next()];
            if let Ok(request) = build_request(client, generator.base_url(), &data) {
                let _ = dispatch(client, request).await;
            }
            self.bump();
        }
    }

    async fn no_stats_static(&self, generator: &mut RequestGenerator, clients: &mut Cycle<usize>) {
        let mut data = RequestData::default();
        if let Err(e) = generator.generate(&mut data) {
            tracing::warn!("request generation failed: {e}");
            while self.jobs.recv().await.is_ok() {
                self.bump();
            }
            return;
        }

        let template = match build_request(&self.clients[0], generator.base_url(), &data) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("request build failed: {e}");
                while self.jobs.recv().await.is_ok() {
                    self.bump();
                }
                return;
            }
        };

        while self.jobs.recv().await.is_ok() {
            let client = &self.clients[*clients.next()];
            if let Some(request) = template.try_clone() {
                let _ = dispatch(client, request).await;
            }
            self.bump();
        }
    }

    async fn dry_run_stats_dynamic(&self, generator: &mut RequestGenerator, responses: &ResponseData) {
        let mut data = RequestData::default();
        while self.jobs.recv().await.is_ok() {
            let started = Instant::now();
            match generator.generate(&mut data) {
                Ok(()) => responses.add(DRY_RUN_KEY, started.elapsed()),
                Err(e) => {
                    let label = e.to_string();
                    tracing::warn!("request generation failed: {label}");
                    responses.add(&label, started.elapsed());
                }
            }
            self.bump();
        }
    }

    async fn dry_run_stats_static(&self, generator: &mut RequestGenerator, responses: &ResponseData) {
        let mut data = RequestData::default();
        if let Err(e) = generator.generate(&mut data) {
            let label = e.to_string();
            tracing::warn!("request generation failed: {label}");
            while self.jobs.recv().await.is_ok() {
                responses.add(&label, Duration::ZERO);
                self.bump();
            }
            return;
        }

        while self.jobs.recv().await.is_ok() {
            responses.add(DRY_RUN_KEY, Duration::ZERO);
            self.bump();
        }
    }

    async fn dry_run_no_stats_dynamic(&self, generator: &mut RequestGenerator) {
        let mut data = RequestData::default();
        while self.jobs.recv().await.is_ok() {
            if let Err(e) = generator.generate(&mut data) {
                tracing::warn!("request generation failed: {e}");
            }
            self.bump();
        }
    }

    async fn dry_run_no_stats_static(&self, generator: &mut RequestGenerator) {
        let mut data = RequestData::default();
        if let Err(e) = generator.generate(&mut data) {
            tracing::warn!("request generation failed: {e}");
        }
        while self.jobs.recv().await.is_ok() {
            self.bump();
        }
    }
}

/// Executes the request and reduces the outcome to its label. The response
/// body is drained so the connection can be reused.
async fn dispatch(client: &Client, request: reqwest::Request) -> String {
    match client.execute(request).await {
        Ok(response) => {
            let status = response.status();
            match response.bytes().await {
                Ok(_) => status.as_str().to_owned(),
                Err(e) => outcome_label(&e),
            }
        }
        Err(e) => outcome_label(&e),
    }
}

/// Stable short label for a transport failure. The innermost source is the
/// most descriptive part of reqwest's error chain; the outer layers repeat
/// the URL, which would fragment the sketch into per-URL labels.
fn outcome_label(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "request timeout".to_owned();
    }
    let mut source: &(dyn std::error::Error + 'static) = err;
    while let Some(next) = source.source() {
        source = next;
    }
    format!("request error: {source}")
}
