use std::time::Duration;

use clap::{Parser, ValueEnum};
use sarin_core::{Error, KeyValue, Result, RunPlan, VALID_PROXY_SCHEMES};
use url::Url;

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
    None,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Templated HTTP load generator", long_about = None)]
pub struct Args {
    /// Target URL (http or https); the path may contain template actions
    #[arg(short, long)]
    pub url: String,

    /// HTTP method; repeat to cycle through several
    #[arg(short, long = "method")]
    pub methods: Vec<String>,

    /// Total number of requests to send
    #[arg(short, long)]
    pub requests: Option<u64>,

    /// Wall-clock budget, e.g. "10s", "1m30s", "500ms"
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Per-request timeout
    #[arg(short, long, value_parser = parse_duration, default_value = "10s")]
    pub timeout: Duration,

    /// Number of concurrent workers
    #[arg(short = 'c', long, default_value_t = 1)]
    pub workers: u32,

    /// Request header as "Key: Value"; repeat for more
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Query parameter as "key=value"; repeat for more
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Cookie as "key=value"; repeat for more
    #[arg(long = "cookie")]
    pub cookies: Vec<String>,

    /// Request body; repeat to cycle through several
    #[arg(short, long = "body")]
    pub bodies: Vec<String>,

    /// Proxy URL (http, https, socks5, socks5h); repeat to cycle
    #[arg(long = "proxy")]
    pub proxies: Vec<String>,

    /// Templated KEY=VALUE block rendered per request and exposed as
    /// {{ Values.KEY }} to all other templates; repeat for more
    #[arg(long = "values")]
    pub values: Vec<String>,

    /// Lua script (inline, @file or @url); repeat for a chain
    #[arg(long)]
    pub lua: Vec<String>,

    /// JavaScript script (inline, @file or @url); repeat for a chain
    #[arg(long)]
    pub js: Vec<String>,

    /// Skip TLS certificate verification
    #[arg(short, long)]
    pub insecure: bool,

    /// Generate requests without sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Report format; "none" disables stats collection entirely
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Suppress the live progress display
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn into_plan(self) -> Result<RunPlan> {
        let mut plan = RunPlan::new(&self.url)?;

        if !self.methods.is_empty() {
            plan.methods = self.methods;
        }
        plan.requests = self.requests;
        plan.duration = self.duration;
        plan.timeout = self.timeout;
        plan.workers = self.workers.max(1);
        plan.headers = parse_key_values(&self.headers, ':')?;
        plan.params = parse_key_values(&self.params, '=')?;
        plan.cookies = parse_key_values(&self.cookies, '=')?;
        plan.bodies = self.bodies;
        plan.values = self.values;
        plan.lua = self.lua;
        plan.js = self.js;
        plan.insecure = self.insecure;
        plan.dry_run = self.dry_run;
        plan.collect_stats = self.output != OutputFormat::None;

        for proxy in &self.proxies {
            let url = Url::parse(proxy)
                .map_err(|e| Error::Other(format!("invalid proxy URL {proxy:?}: {e}")))?;
            if !VALID_PROXY_SCHEMES.contains(&url.scheme()) {
                return Err(Error::Other(format!(
                    "unsupported proxy scheme: {}",
                    url.scheme()
                )));
            }
            plan.proxies.push(url);
        }

        Ok(plan)
    }
}

fn parse_key_values(raw: &[String], separator: char) -> Result<Vec<KeyValue>> {
    raw.iter()
        .map(|entry| {
            let (key, value) = entry.split_once(separator).ok_or_else(|| {
                Error::Other(format!("expected \"key{separator}value\", got {entry:?}"))
            })?;
            Ok(KeyValue::single(key.trim(), value.trim_start()))
        })
        .collect()
}

/// Parses "1h2m3s", "500ms", "90s", "1.5s" style durations. A bare number
/// means seconds.
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_owned());
    }
    if let Ok(secs) = input.parse::<f64>() {
        if secs < 0.0 {
            return Err(format!("negative duration: {input}"));
        }
        return Ok(Duration::from_secs_f64(secs));
    }

    let mut total = Duration::ZERO;
    let mut number = String::new();
    let mut unit = String::new();
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        number.clear();
        unit.clear();
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() || *c == '.' {
                number.push(*c);
                chars.next();
            } else {
                break;
            }
        }
        while let Some(c) = chars.peek() {
            if c.is_alphabetic() || *c == 'µ' {
                unit.push(*c);
                chars.next();
            } else {
                break;
            }
        }

        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid duration: {input}"))?;
        let scaled = match unit.as_str() {
            "ns" => Duration::from_secs_f64(value / 1e9),
            "us" | "µs" => Duration::from_secs_f64(value / 1e6),
            "ms" => Duration::from_secs_f64(value / 1e3),
            "s" => Duration::from_secs_f64(value),
            "m" => Duration::from_secs_f64(value * 60.0),
            "h" => Duration::from_secs_f64(value * 3600.0),
            _ => return Err(format!("invalid duration unit {unit:?} in {input:?}")),
        };
        total += scaled;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_parse_with_suffixes() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        // bare numbers are seconds
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn headers_split_on_colon() {
        let parsed = parse_key_values(&["X-Token: abc: def".to_owned()], ':').unwrap();
        assert_eq!(parsed[0].key, "X-Token");
        assert_eq!(parsed[0].values, vec!["abc: def"]);
    }

    #[test]
    fn params_split_on_equals() {
        let parsed = parse_key_values(&["q=rust lang".to_owned()], '=').unwrap();
        assert_eq!(parsed[0].key, "q");
        assert_eq!(parsed[0].values, vec!["rust lang"]);
    }

    #[test]
    fn malformed_pair_is_rejected() {
        assert!(parse_key_values(&["no-separator".to_owned()], '=').is_err());
    }

    #[test]
    fn args_build_a_plan() {
        let args = Args::parse_from([
            "sarin",
            "--url",
            "http://localhost:8080/api",
            "--method",
            "GET",
            "--method",
            "POST",
            "--requests",
            "100",
            "--timeout",
            "2s",
            "-c",
            "4",
            "-H",
            "X-A: 1",
            "--output",
            "json",
        ]);
        let plan = args.into_plan().unwrap();
        assert_eq!(plan.methods, vec!["GET", "POST"]);
        assert_eq!(plan.requests, Some(100));
        assert_eq!(plan.timeout, Duration::from_secs(2));
        assert_eq!(plan.workers, 4);
        assert_eq!(plan.headers[0].key, "X-A");
        assert!(plan.collect_stats);
        assert_eq!(plan.path, "/api");
    }

    #[test]
    fn output_none_disables_stats() {
        let args = Args::parse_from(["sarin", "-u", "http://x/", "-o", "none"]);
        let plan = args.into_plan().unwrap();
        assert!(!plan.collect_stats);
    }

    #[test]
    fn invalid_proxy_scheme_is_rejected() {
        let args = Args::parse_from(["sarin", "-u", "http://x/", "--proxy", "ftp://p:1"]);
        assert!(args.into_plan().is_err());
    }
}
