use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue, COOKIE, USER_AGENT};
use reqwest::{Client, Method};
use url::Url;

use crate::cycle::Cycle;
use crate::error::{Error, Result};
use crate::filecache::FileCache;
use crate::script::Transformer;
use crate::template::{Producer, Templates};
use crate::{KeyValue, RunPlan};

/// Per-request scratch value. One instance per worker, reset between jobs,
/// handed to the script chain as the mutable request view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestData {
    pub method: String,
    pub url: String,
    pub path: String,
    pub body: String,
    pub headers: HashMap<String, Vec<String>>,
    pub params: HashMap<String, Vec<String>>,
    pub cookies: HashMap<String, Vec<String>>,
}

impl RequestData {
    pub fn reset(&mut self) {
        self.method.clear();
        self.url.clear();
        self.path.clear();
        self.body.clear();
        self.headers.clear();
        self.params.clear();
        self.cookies.clear();
    }
}

struct KeyValueProducer {
    key: Producer,
    values: Cycle<Producer>,
}

/// Materializes a fresh request from the plan's field templates.
///
/// Owned by exactly one worker: the cycles, template environments and
/// script interpreters inside are single-threaded state.
pub struct RequestGenerator {
    templates: Templates,
    base_url: Url,
    path: Producer,
    methods: Cycle<Producer>,
    bodies: Option<Cycle<Producer>>,
    headers: Vec<KeyValueProducer>,
    params: Vec<KeyValueProducer>,
    cookies: Vec<KeyValueProducer>,
    values: Vec<Producer>,
    transformer: Option<Transformer>,
    dynamic: bool,
}

impl RequestGenerator {
    pub fn new(plan: &RunPlan, cache: Arc<FileCache>, transformer: Option<Transformer>) -> Self {
        let mut templates = Templates::new(cache);
        let mut rng = rand::rng();
        let mut dynamic = false;

        let path = templates.compile(&plan.path, false);
        dynamic |= path.is_dynamic();

        let default_methods = vec!["GET".to_owned()];
        let method_specs = if plan.methods.is_empty() {
            &default_methods
        } else {
            &plan.methods
        };
        let methods = compile_alternatives(&mut templates, method_specs, false, &mut dynamic, &mut rng);

        let bodies = if plan.bodies.is_empty() {
            None
        } else {
            Some(compile_alternatives(
                &mut templates,
                &plan.bodies,
                true,
                &mut dynamic,
                &mut rng,
            ))
        };

        let headers = compile_key_values(&mut templates, &plan.headers, &mut dynamic, &mut rng);
        let params = compile_key_values(&mut templates, &plan.params, &mut dynamic, &mut rng);
        let cookies = compile_key_values(&mut templates, &plan.cookies, &mut dynamic, &mut rng);

        // Values blocks never make a request dynamic on their own: they only
        // matter when another field references them, and that field already
        // carries the dynamism flag.
        let values = plan
            .values
            .iter()
            .map(|v| templates.compile(v, false))
            .collect();

        let has_scripts = transformer.as_ref().is_some_and(|t| !t.is_empty());
        dynamic |= has_scripts;

        RequestGenerator {
            templates,
            base_url: plan.url.clone(),
            path,
            methods,
            bodies,
            headers,
            params,
            cookies,
            values,
            transformer,
            dynamic,
        }
    }

    /// True when anything about the request changes between invocations.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fills `out` with a freshly generated request.
    pub fn generate(&mut self, out: &mut RequestData) -> Result<()> {
        out.reset();

        let values = self.render_values()?;

        out.path = self.templates.render(&self.path, &values)?;
        out.url = full_url(&self.base_url, &out.path);
        out.method = self.templates.render(self.methods.next(), &values)?;

        self.templates.form_data().clear();
        if let Some(bodies) = &mut self.bodies {
            out.body = self.templates.render(bodies.next(), &values)?;
        }

        for header in &mut self.headers {
            let key = self.templates.render(&header.key, &values)?;
            let value = self.templates.render(header.values.next(), &values)?;
            out.headers.entry(key).or_default().push(value);
        }
        if let Some(content_type) = self.templates.form_data().get() {
            if out
                .headers
                .keys()
                .any(|k| k.eq_ignore_ascii_case("content-type"))
            {
                tracing::warn!(
                    "explicit Content-Type header combined with body_FormData; both will be sent"
                );
            }
            out.headers
                .entry("Content-Type".to_owned())
                .or_default()
                .push(content_type);
        }

        for param in &mut self.params {
            let key = self.templates.render(&param.key, &values)?;
            let value = self.templates.render(param.values.next(), &values)?;
            out.params.entry(key).or_default().push(value);
        }

        for cookie in &mut self.cookies {
            let key = self.templates.render(&cookie.key, &values)?;
            let value = self.templates.render(cookie.values.next(), &values)?;
            out.cookies.entry(key).or_default().push(value);
        }

        if let Some(transformer) = &mut self.transformer {
            transformer.transform(out)?;
        }

        Ok(())
    }

    fn render_values(&self) -> Result<HashMap<String, String>> {
        let empty = HashMap::new();
        let mut merged = HashMap::new();
        for block in &self.values {
            let rendered = self.templates.render(block, &empty)?;
            merged.extend(crate::template::parse_values_block(&rendered)?);
        }
        Ok(merged)
    }
}

fn compile_alternatives<R: rand::Rng>(
    templates: &mut Templates,
    specs: &[String],
    body: bool,
    dynamic: &mut bool,
    rng: &mut R,
) -> Cycle<Producer> {
    let producers: Vec<Producer> = specs
        .iter()
        .map(|spec| {
            let producer = templates.compile(spec, body);
            *dynamic |= producer.is_dynamic();
            producer
        })
        .collect();
    if producers.len() > 1 {
        *dynamic = true;
    }
    Cycle::new(producers, rng)
}

fn compile_key_values<R: rand::Rng>(
    templates: &mut Templates,
    items: &[KeyValue],
    dynamic: &mut bool,
    rng: &mut R,
) -> Vec<KeyValueProducer> {
    items
        .iter()
        .map(|item| {
            let key = templates.compile(&item.key, false);
            *dynamic |= key.is_dynamic();
            let values = compile_alternatives(templates, &item.values, false, dynamic, rng);
            KeyValueProducer { key, values }
        })
        .collect()
}

fn full_url(base: &Url, path: &str) -> String {
    let mut url = base.clone();
    apply_path(&mut url, path);
    url.to_string()
}

fn apply_path(url: &mut Url, path: &str) {
    let path = if path.is_empty() { "/" } else { path };
    match path.split_once('?') {
        Some((p, q)) => {
            url.set_path(p);
            url.set_query(Some(q));
        }
        None => {
            url.set_path(path);
            url.set_query(None);
        }
    }
}

/// Builds the wire request from a generated [`RequestData`].
pub fn build_request(client: &Client, base: &Url, data: &RequestData) -> Result<reqwest::Request> {
    let method = Method::from_bytes(data.method.as_bytes())
        .map_err(|_| Error::InvalidMethod(data.method.clone()))?;

    let mut url = base.clone();
    apply_path(&mut url, &data.path);
    for (key, values) in &data.params {
        for value in values {
            url.query_pairs_mut().append_pair(key, value);
        }
    }

    let mut builder = client.request(method, url);

    let mut has_user_agent = false;
    for (key, values) in &data.headers {
        if key.eq_ignore_ascii_case("user-agent") {
            has_user_agent = true;
        }
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| Error::InvalidHeaderName(key.clone()))?;
        for value in values {
            let value =
                HeaderValue::from_str(value).map_err(|_| Error::InvalidHeaderValue(key.clone()))?;
            builder = builder.header(name.clone(), value);
        }
    }
    if !has_user_agent {
        builder = builder.header(USER_AGENT, crate::USER_AGENT);
    }

    if !data.cookies.is_empty() {
        let mut pairs: Vec<String> = Vec::new();
        let mut keys: Vec<&String> = data.cookies.keys().collect();
        keys.sort();
        for key in keys {
            for value in &data.cookies[key] {
                pairs.push(format!("{key}={value}"));
            }
        }
        let cookie = HeaderValue::from_str(&pairs.join("; "))
            .map_err(|_| Error::InvalidHeaderValue("Cookie".to_owned()))?;
        builder = builder.header(COOKIE, cookie);
    }

    if !data.body.is_empty() {
        builder = builder.body(data.body.clone());
    }

    builder.build().map_err(Error::Http)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn plan(target: &str) -> RunPlan {
        RunPlan::new(target).unwrap()
    }

    fn cache() -> Arc<FileCache> {
        Arc::new(FileCache::new(Duration::from_secs(1)))
    }

    #[test]
    fn static_plan_generates_identical_requests() {
        let mut p = plan("http://127.0.0.1:8080/fixed");
        p.headers.push(KeyValue {
            key: "X-Static".to_owned(),
            values: vec!["one".to_owned()],
        });
        p.bodies.push("payload".to_owned());

        let mut generator = RequestGenerator::new(&p, cache(), None);
        assert!(!generator.is_dynamic());

        let mut first = RequestData::default();
        let mut second = RequestData::default();
        generator.generate(&mut first).unwrap();
        generator.generate(&mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.method, "GET");
        assert_eq!(first.path, "/fixed");
        assert_eq!(first.body, "payload");
    }

    #[test]
    fn multiple_methods_make_plan_dynamic_and_cycle() {
        let mut p = plan("http://localhost/");
        p.methods = vec!["GET".to_owned(), "POST".to_owned(), "PUT".to_owned()];

        let mut generator = RequestGenerator::new(&p, cache(), None);
        assert!(generator.is_dynamic());

        let mut data = RequestData::default();
        let mut seen = Vec::new();
        for _ in 0..6 {
            generator.generate(&mut data).unwrap();
            seen.push(data.method.clone());
        }
        for method in ["GET", "POST", "PUT"] {
            assert_eq!(seen.iter().filter(|m| *m == method).count(), 2);
        }
    }

    #[test]
    fn templated_path_is_dynamic() {
        let mut p = plan("http://localhost/users");
        p.path = "/users/{{ fakeit_IntN(5) }}".to_owned();
        let generator = RequestGenerator::new(&p, cache(), None);
        assert!(generator.is_dynamic());
    }

    #[test]
    fn values_bind_into_fields() {
        let mut p = plan("http://localhost/");
        p.values = vec!["REQ_ID=fixed-id".to_owned()];
        p.headers.push(KeyValue {
            key: "X-Request-Id".to_owned(),
            values: vec!["{{ Values.REQ_ID }}".to_owned()],
        });

        let mut generator = RequestGenerator::new(&p, cache(), None);
        let mut data = RequestData::default();
        generator.generate(&mut data).unwrap();
        assert_eq!(data.headers["X-Request-Id"], vec!["fixed-id"]);
    }

    #[test]
    fn form_data_content_type_is_appended_after_headers() {
        let mut p = plan("http://localhost/upload");
        p.bodies = vec!["{{ body_FormData(\"k\", \"v\") }}".to_owned()];

        let mut generator = RequestGenerator::new(&p, cache(), None);
        let mut data = RequestData::default();
        generator.generate(&mut data).unwrap();

        let content_types = &data.headers["Content-Type"];
        assert_eq!(content_types.len(), 1);
        assert!(content_types[0].starts_with("multipart/form-data; boundary="));
        assert!(data.body.contains("Content-Disposition: form-data; name=\"k\""));
    }

    #[test]
    fn generation_error_surfaces_for_bad_function() {
        let mut p = plan("http://localhost/");
        p.path = "/{{ not_a_function() }}".to_owned();
        let mut generator = RequestGenerator::new(&p, cache(), None);
        let mut data = RequestData::default();
        assert!(generator.generate(&mut data).is_err());
    }

    #[test]
    fn build_request_sets_default_user_agent() {
        let p = plan("http://localhost:9/");
        let client = Client::new();
        let mut data = RequestData::default();
        data.method = "GET".to_owned();
        data.path = "/".to_owned();
        let request = build_request(&client, &p.url, &data).unwrap();
        assert_eq!(
            request.headers().get(USER_AGENT).unwrap().to_str().unwrap(),
            crate::USER_AGENT
        );
    }

    #[test]
    fn build_request_keeps_user_supplied_user_agent() {
        let p = plan("http://localhost:9/");
        let client = Client::new();
        let mut data = RequestData::default();
        data.method = "GET".to_owned();
        data.path = "/".to_owned();
        data.headers
            .insert("User-Agent".to_owned(), vec!["custom/1.0".to_owned()]);
        let request = build_request(&client, &p.url, &data).unwrap();
        assert_eq!(
            request.headers().get(USER_AGENT).unwrap().to_str().unwrap(),
            "custom/1.0"
        );
    }

    #[test]
    fn build_request_emits_params_and_cookies() {
        let p = plan("http://localhost:9/");
        let client = Client::new();
        let mut data = RequestData::default();
        data.method = "POST".to_owned();
        data.path = "/search?base=1".to_owned();
        data.params.insert("q".to_owned(), vec!["rust".to_owned()]);
        data.cookies
            .insert("session".to_owned(), vec!["abc".to_owned()]);
        data.body = "hello".to_owned();

        let request = build_request(&client, &p.url, &data).unwrap();
        let url = request.url().as_str();
        assert!(url.contains("base=1"));
        assert!(url.contains("q=rust"));
        assert_eq!(
            request.headers().get(COOKIE).unwrap().to_str().unwrap(),
            "session=abc"
        );
    }

    #[test]
    fn build_request_rejects_invalid_method() {
        let p = plan("http://localhost:9/");
        let client = Client::new();
        let mut data = RequestData::default();
        data.method = "BAD METHOD".to_owned();
        data.path = "/".to_owned();
        assert!(build_request(&client, &p.url, &data).is_err());
    }
}
