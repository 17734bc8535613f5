//! Request-generation and dispatch engine for the `sarin` load generator.
//!
//! The CLI hands a fully-resolved [`RunPlan`] to [`Sarin::new`], drives
//! [`Sarin::run`] with a cancellation token, and renders the [`Report`]
//! from [`Sarin::stats`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

mod client;
mod cycle;
mod error;
mod filecache;
mod funcs;
mod request;
mod runner;
pub mod script;
mod stats;
mod template;

pub use client::VALID_PROXY_SCHEMES;
pub use error::{Error, Result};
pub use request::RequestData;
pub use stats::{BigCount, HumanDuration, Report, ResponseStat, DEFAULT_ACCURACY, DRY_RUN_KEY};

/// Default User-Agent, sent only when the plan supplies none.
pub const USER_AGENT: &str = concat!("Sarin/", env!("CARGO_PKG_VERSION"));

pub const VALID_URL_SCHEMES: [&str; 2] = ["http", "https"];

/// One header/param/cookie specification: a key plus one or more value
/// alternatives. Duplicate keys are allowed; multiple values cycle per
/// request with a random start.
#[derive(Debug, Clone)]
pub struct KeyValue {
    pub key: String,
    pub values: Vec<String>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, values: Vec<String>) -> Self {
        KeyValue {
            key: key.into(),
            values,
        }
    }

    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            values: vec![value.into()],
        }
    }
}

/// The frozen test configuration. Built and validated by the CLI layer,
/// immutable once handed to the core.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Scheme + authority of the target; the path lives in `path` because
    /// it may carry template actions that URL parsing would mangle.
    pub url: Url,
    pub path: String,
    pub methods: Vec<String>,
    pub timeout: Duration,
    pub workers: u32,
    pub requests: Option<u64>,
    pub duration: Option<Duration>,
    pub headers: Vec<KeyValue>,
    pub params: Vec<KeyValue>,
    pub cookies: Vec<KeyValue>,
    pub bodies: Vec<String>,
    pub proxies: Vec<Url>,
    pub values: Vec<String>,
    pub lua: Vec<String>,
    pub js: Vec<String>,
    pub insecure: bool,
    pub dry_run: bool,
    pub collect_stats: bool,
}

impl RunPlan {
    /// A plan with defaults for everything except the target.
    pub fn new(target: &str) -> Result<RunPlan> {
        let (url, path) = parse_target(target)?;
        Ok(RunPlan {
            url,
            path,
            methods: vec!["GET".to_owned()],
            timeout: Duration::from_secs(10),
            workers: 1,
            requests: None,
            duration: None,
            headers: Vec::new(),
            params: Vec::new(),
            cookies: Vec::new(),
            bodies: Vec::new(),
            proxies: Vec::new(),
            values: Vec::new(),
            lua: Vec::new(),
            js: Vec::new(),
            insecure: false,
            dry_run: false,
            collect_stats: true,
        })
    }
}

/// Splits a raw target into a parsed `scheme://authority` URL and the raw
/// path-and-query remainder. The remainder is kept verbatim so template
/// actions inside the path survive; scheme and host are never templated.
pub fn parse_target(raw: &str) -> Result<(Url, String)> {
    let (scheme, rest) = raw
        .split_once("://")
        .ok_or_else(|| Error::Other(format!("invalid URL {raw:?}: missing scheme")))?;
    if !VALID_URL_SCHEMES.contains(&scheme) {
        return Err(Error::Other(format!("invalid URL scheme {scheme:?}")));
    }

    let (authority, path) = match rest.find('/') {
        Some(index) => (&rest[..index], &rest[index..]),
        None => (rest, "/"),
    };
    if authority.is_empty() {
        return Err(Error::Other(format!("invalid URL {raw:?}: missing host")));
    }

    let base = Url::parse(&format!("{scheme}://{authority}"))
        .map_err(|e| Error::Other(format!("invalid URL {raw:?}: {e}")))?;
    Ok((base, path.to_owned()))
}

/// The core engine: owns the client pool, the loaded script chain, the
/// file cache and the latency sketch.
pub struct Sarin {
    plan: Arc<RunPlan>,
    clients: Arc<Vec<reqwest::Client>>,
    chain: Arc<script::Chain>,
    cache: Arc<filecache::FileCache>,
    responses: Option<Arc<stats::ResponseData>>,
    counter: Arc<AtomicU64>,
}

impl Sarin {
    /// Eager construction: builds the client pool, loads and validates the
    /// script sources. Any failure here aborts the run before it starts.
    pub async fn new(plan: RunPlan) -> Result<Sarin> {
        let clients = client::build_clients(&plan)?;

        let loader = reqwest::Client::new();
        let chain = script::Chain::load(&loader, &plan.lua, &plan.js).await?;
        chain.validate()?;

        let responses = plan
            .collect_stats
            .then(|| Arc::new(stats::ResponseData::new(DEFAULT_ACCURACY)));

        Ok(Sarin {
            cache: Arc::new(filecache::FileCache::new(plan.timeout)),
            plan: Arc::new(plan),
            clients: Arc::new(clients),
            chain: Arc::new(chain),
            responses,
            counter: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Runs the load test to completion: blocks until the budget is
    /// reached or `cancel` fires. Cancellation is orderly; samples already
    /// recorded are never lost.
    pub async fn run(&self, cancel: CancellationToken) {
        runner::Runner {
            plan: Arc::clone(&self.plan),
            cache: Arc::clone(&self.cache),
            chain: Arc::clone(&self.chain),
            clients: Arc::clone(&self.clients),
            responses: self.responses.clone(),
            counter: Arc::clone(&self.counter),
        }
        .run(cancel)
        .await;
    }

    /// Summary of all recorded outcomes. With stats collection disabled
    /// this is an empty, well-formed report.
    pub fn stats(&self) -> Report {
        match &self.responses {
            Some(responses) => responses.report(),
            None => Report {
                responses: BTreeMap::new(),
                total: ResponseStat::default(),
            },
        }
    }

    /// Completed iterations so far; feeds the progress display.
    pub fn completed(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_target_splits_authority_and_path() {
        let (url, path) = parse_target("http://example.com:8080/a/b?q=1").unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/");
        assert_eq!(path, "/a/b?q=1");
    }

    #[test]
    fn parse_target_defaults_path_to_root() {
        let (url, path) = parse_target("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(path, "/");
    }

    #[test]
    fn parse_target_keeps_template_actions_in_path() {
        let (_, path) = parse_target("http://example.com/users/{{ fakeit_IntN(5) }}").unwrap();
        assert_eq!(path, "/users/{{ fakeit_IntN(5) }}");
    }

    #[test]
    fn parse_target_rejects_bad_schemes() {
        assert!(parse_target("ftp://example.com/").is_err());
        assert!(parse_target("example.com").is_err());
        assert!(parse_target("http:///nohost").is_err());
    }

    #[tokio::test]
    async fn build_fails_on_invalid_script() {
        let mut plan = RunPlan::new("http://127.0.0.1:1/").unwrap();
        plan.lua = vec!["this is not lua".to_owned()];
        assert!(Sarin::new(plan).await.is_err());
    }

    #[tokio::test]
    async fn stats_without_collection_is_empty() {
        let mut plan = RunPlan::new("http://127.0.0.1:1/").unwrap();
        plan.collect_stats = false;
        let core = Sarin::new(plan).await.unwrap();
        let report = core.stats();
        assert!(report.responses.is_empty());
        assert_eq!(core.completed(), 0);
    }
}
