//! Per-request scripting hooks.
//!
//! Script sources are loaded once at startup; interpreter instances are
//! created per worker because neither engine is safe for concurrent use.
//! Lua scripts run first, then JavaScript scripts, in declaration order;
//! the output of script *i* is the input of script *i + 1*.

mod js;
mod lua;

pub use js::JsEngine;
pub use lua::LuaEngine;

use std::time::Duration;

use crate::error::{Error, Result};
use crate::request::RequestData;

const SCRIPT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Loaded script sources shared by all workers.
pub struct Chain {
    lua: Vec<String>,
    js: Vec<String>,
}

impl Chain {
    /// Loads every script source. A spec is inline text, `@path`,
    /// `@http(s)://url`, or `@@…` for an inline script starting with a
    /// literal `@`.
    pub async fn load(http: &reqwest::Client, lua: &[String], js: &[String]) -> Result<Chain> {
        Ok(Chain {
            lua: load_sources(http, lua).await?,
            js: load_sources(http, js).await?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lua.is_empty() && self.js.is_empty()
    }

    /// Validates every source by instantiating its engine once: this checks
    /// syntax and the presence of a global `transform` function.
    pub fn validate(&self) -> Result<()> {
        self.new_transformer().map(drop)
    }

    /// Creates interpreter instances for one worker.
    pub fn new_transformer(&self) -> Result<Transformer> {
        let mut lua_engines = Vec::with_capacity(self.lua.len());
        for (index, source) in self.lua.iter().enumerate() {
            lua_engines.push(LuaEngine::new(source).map_err(|e| Error::ScriptChain {
                engine: "lua",
                index,
                reason: e.to_string(),
            })?);
        }

        let mut js_engines = Vec::with_capacity(self.js.len());
        for (index, source) in self.js.iter().enumerate() {
            js_engines.push(JsEngine::new(source).map_err(|e| Error::ScriptChain {
                engine: "js",
                index,
                reason: e.to_string(),
            })?);
        }

        Ok(Transformer {
            lua: lua_engines,
            js: js_engines,
        })
    }
}

/// Instantiated script engines for a single worker. Not shared.
pub struct Transformer {
    lua: Vec<LuaEngine>,
    js: Vec<JsEngine>,
}

impl Transformer {
    pub fn is_empty(&self) -> bool {
        self.lua.is_empty() && self.js.is_empty()
    }

    /// Applies all scripts to the request, Lua first, then JavaScript.
    pub fn transform(&mut self, req: &mut RequestData) -> Result<()> {
        for (index, engine) in self.lua.iter().enumerate() {
            engine.transform(req).map_err(|e| Error::ScriptChain {
                engine: "lua",
                index,
                reason: e.to_string(),
            })?;
        }
        for (index, engine) in self.js.iter().enumerate() {
            engine.transform(req).map_err(|e| Error::ScriptChain {
                engine: "js",
                index,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

async fn load_sources(http: &reqwest::Client, specs: &[String]) -> Result<Vec<String>> {
    let mut sources = Vec::with_capacity(specs.len());
    for spec in specs {
        sources.push(load_source(http, spec).await?);
    }
    Ok(sources)
}

async fn load_source(http: &reqwest::Client, spec: &str) -> Result<String> {
    if spec.is_empty() {
        return Err(Error::ScriptLoad {
            origin: spec.to_owned(),
            reason: "script source cannot be empty".to_owned(),
        });
    }

    if let Some(inline) = spec.strip_prefix("@@") {
        // Escaped leading @: inline script starting with a literal @.
        return Ok(format!("@{inline}"));
    }

    let Some(reference) = spec.strip_prefix('@') else {
        return Ok(spec.to_owned());
    };

    if reference.starts_with("http://") || reference.starts_with("https://") {
        let response = http
            .get(reference)
            .timeout(SCRIPT_FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::ScriptLoad {
                origin: reference.to_owned(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::ScriptLoad {
                origin: reference.to_owned(),
                reason: format!("HTTP {status}"),
            });
        }
        response.text().await.map_err(|e| Error::ScriptLoad {
            origin: reference.to_owned(),
            reason: e.to_string(),
        })
    } else {
        std::fs::read_to_string(reference).map_err(|e| Error::ScriptLoad {
            origin: reference.to_owned(),
            reason: e.to_string(),
        })
    }
}
