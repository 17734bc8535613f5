use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use sarin_core::{RunPlan, Sarin};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Minimal keep-alive HTTP/1.1 server: answers every request with
/// `200 ok` after `delay`, optionally recording request heads.
async fn spawn_server(delay: Duration, log: Option<Arc<Mutex<Vec<String>>>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let log = log.clone();
            tokio::spawn(async move {
                let (read_half, mut write_half) = stream.into_split();
                let mut reader = BufReader::new(read_half);

                loop {
                    let mut head = String::new();
                    let mut content_length = 0usize;
                    loop {
                        let mut line = String::new();
                        match reader.read_line(&mut line).await {
                            Ok(0) | Err(_) => return,
                            Ok(_) => {}
                        }
                        if line.trim_end().is_empty() {
                            break;
                        }
                        if let Some(value) = line
                            .to_ascii_lowercase()
                            .trim_end()
                            .strip_prefix("content-length:")
                        {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                        head.push_str(&line);
                    }
                    if head.is_empty() {
                        return;
                    }
                    if content_length > 0 {
                        let mut body = vec![0u8; content_length];
                        if reader.read_exact(&mut body).await.is_err() {
                            return;
                        }
                    }
                    if let Some(log) = &log {
                        log.lock().unwrap().push(head);
                    }

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let response =
                        "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: keep-alive\r\n\r\nok";
                    if write_half.write_all(response.as_bytes()).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    addr
}

fn count_of(report: &sarin_core::Report, label: &str) -> u64 {
    report
        .responses
        .get(label)
        .map(|s| s.count.0.clone().try_into().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn static_get_records_every_request() {
    let addr = spawn_server(Duration::ZERO, None).await;
    let mut plan = RunPlan::new(&format!("http://{addr}/")).unwrap();
    plan.requests = Some(3);

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let report = core.stats();
    assert_eq!(count_of(&report, "200"), 3);
    assert_eq!(report.total.count.0, BigUint::from(3u32));
    assert_eq!(core.completed(), 3);

    // total equals the sum of per-label counts
    let sum: BigUint = report.responses.values().map(|s| s.count.0.clone()).sum();
    assert_eq!(report.total.count.0, sum);

    let stat = &report.responses["200"];
    assert!(stat.min.0 <= stat.p90.0);
    assert!(stat.p90.0 <= stat.p95.0);
    assert!(stat.p95.0 <= stat.p99.0);
    assert!(stat.p99.0 <= stat.max.0);
    assert!(stat.min.0 <= stat.average.0 && stat.average.0 <= stat.max.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dry_run_never_touches_the_network() {
    // Port 9 (discard) with nothing listening: any dispatch would fail
    // loudly, so an all-dry-run report proves nothing was sent.
    let mut plan = RunPlan::new("http://127.0.0.1:9/").unwrap();
    plan.requests = Some(5);
    plan.dry_run = true;

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let report = core.stats();
    assert_eq!(report.responses.len(), 1);
    assert_eq!(count_of(&report, "dry-run"), 5);
    assert_eq!(core.completed(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn duration_budget_bounds_the_run() {
    let addr = spawn_server(Duration::from_millis(100), None).await;
    let mut plan = RunPlan::new(&format!("http://{addr}/")).unwrap();
    plan.duration = Some(Duration::from_secs(1));

    let core = Sarin::new(plan).await.unwrap();
    let started = Instant::now();
    core.run(CancellationToken::new()).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(1), "run ended early: {elapsed:?}");
    assert!(
        elapsed <= Duration::from_millis(1600),
        "run overshot the deadline: {elapsed:?}"
    );

    let report = core.stats();
    let count = count_of(&report, "200");
    assert!(
        (5..=13).contains(&count),
        "unexpected request count: {count}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn methods_cycle_evenly() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_server(Duration::ZERO, Some(Arc::clone(&log))).await;

    let mut plan = RunPlan::new(&format!("http://{addr}/")).unwrap();
    plan.methods = vec!["GET".to_owned(), "POST".to_owned(), "PUT".to_owned()];
    plan.requests = Some(30);

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let heads = log.lock().unwrap();
    assert_eq!(heads.len(), 30);
    for method in ["GET ", "POST ", "PUT "] {
        let seen = heads.iter().filter(|h| h.starts_with(method)).count();
        assert_eq!(seen, 10, "method {method} seen {seen} times");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timeout_produces_error_label() {
    let addr = spawn_server(Duration::from_secs(2), None).await;
    let mut plan = RunPlan::new(&format!("http://{addr}/")).unwrap();
    plan.requests = Some(3);
    plan.timeout = Duration::from_millis(200);

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let report = core.stats();
    assert!(!report.responses.contains_key("200"));
    assert_eq!(report.total.count.0, BigUint::from(3u32));
    assert!(
        report
            .responses
            .keys()
            .any(|label| label.contains("timeout")),
        "no timeout label in {:?}",
        report.responses.keys().collect::<Vec<_>>()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn script_mutations_reach_the_wire() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_server(Duration::ZERO, Some(Arc::clone(&log))).await;

    let mut plan = RunPlan::new(&format!("http://{addr}/")).unwrap();
    plan.requests = Some(1);
    plan.lua = vec![r#"
function transform(req)
    req.headers["X-Test"] = {"v"}
    return req
end"#
        .to_owned()];
    plan.js = vec![r#"
function transform(req) {
    req.headers["X-Test2"] = ["w"];
    return req;
}"#
    .to_owned()];

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let report = core.stats();
    assert_eq!(count_of(&report, "200"), 1);

    let heads = log.lock().unwrap();
    assert_eq!(heads.len(), 1);
    let head = heads[0].to_ascii_lowercase();
    assert!(head.contains("x-test: v"), "head was: {head}");
    assert!(head.contains("x-test2: w"), "head was: {head}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn default_user_agent_is_sent() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_server(Duration::ZERO, Some(Arc::clone(&log))).await;

    let mut plan = RunPlan::new(&format!("http://{addr}/")).unwrap();
    plan.requests = Some(1);

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let heads = log.lock().unwrap();
    assert!(heads[0].to_ascii_lowercase().contains("user-agent: sarin/"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_before_any_job_yields_empty_report() {
    let mut plan = RunPlan::new("http://127.0.0.1:9/").unwrap();
    plan.duration = Some(Duration::from_secs(30));

    let cancel = CancellationToken::new();
    cancel.cancel();

    let core = Sarin::new(plan).await.unwrap();
    core.run(cancel).await;

    let report = core.stats();
    assert_eq!(report.total.count.0, BigUint::from(0u32));
    assert!(report.responses.is_empty());
    assert_eq!(core.completed(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generation_errors_become_outcome_labels() {
    let mut plan = RunPlan::new("http://127.0.0.1:9/").unwrap();
    plan.requests = Some(2);
    plan.dry_run = true;
    plan.path = "/{{ no_such_function() }}".to_owned();

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let report = core.stats();
    assert_eq!(report.total.count.0, BigUint::from(2u32));
    assert!(!report.responses.contains_key("dry-run"));
    assert!(report
        .responses
        .keys()
        .all(|label| label.contains("template rendering")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn many_workers_split_a_fixed_budget() {
    let addr = spawn_server(Duration::ZERO, None).await;
    let mut plan = RunPlan::new(&format!("http://{addr}/")).unwrap();
    plan.requests = Some(20);
    plan.workers = 4;

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let report = core.stats();
    assert_eq!(count_of(&report, "200"), 20);
    assert_eq!(core.completed(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cookies_and_params_reach_the_wire() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_server(Duration::ZERO, Some(Arc::clone(&log))).await;

    let mut plan = RunPlan::new(&format!("http://{addr}/search")).unwrap();
    plan.requests = Some(1);
    plan.params
        .push(sarin_core::KeyValue::single("q", "rust"));
    plan.cookies
        .push(sarin_core::KeyValue::single("session", "abc"));

    let core = Sarin::new(plan).await.unwrap();
    core.run(CancellationToken::new()).await;

    let heads = log.lock().unwrap();
    let head = heads[0].to_ascii_lowercase();
    assert!(head.contains("/search?q=rust"), "head was: {head}");
    assert!(head.contains("cookie: session=abc"), "head was: {head}");
}
