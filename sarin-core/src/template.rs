use std::collections::HashMap;
use std::sync::Arc;

use minijinja::{context, Environment};

use crate::error::{Error, Result};
use crate::filecache::FileCache;
use crate::funcs::{self, FormDataState};

/// True when the source contains template action markers. Fields without
/// actions (and with a single alternative) take the static fast path.
pub fn has_template_actions(source: &str) -> bool {
    source.contains("{{") || source.contains("{%")
}

/// A compiled field: either a constant or a named template in one of the
/// worker's environments.
#[derive(Debug, Clone)]
pub enum Producer {
    Static(String),
    Template { name: String, body: bool },
}

impl Producer {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Producer::Template { .. })
    }
}

/// Per-worker template environments.
///
/// The function registry is shared between all fields of the worker; the
/// body environment additionally carries `body_FormData` and its
/// Content-Type side channel. Environments are never shared between
/// workers.
pub struct Templates {
    env: Environment<'static>,
    body_env: Environment<'static>,
    form_data: Arc<FormDataState>,
    next_id: usize,
}

impl Templates {
    pub fn new(cache: Arc<FileCache>) -> Self {
        let mut env = Environment::new();
        funcs::register_functions(&mut env, Arc::clone(&cache));

        let form_data = Arc::new(FormDataState::default());
        let mut body_env = Environment::new();
        funcs::register_body_functions(&mut body_env, cache, Arc::clone(&form_data));

        Templates {
            env,
            body_env,
            form_data,
            next_id: 0,
        }
    }

    pub fn form_data(&self) -> &FormDataState {
        &self.form_data
    }

    /// Compiles `source` into a producer. Sources without template actions
    /// stay constants; so do sources that fail to parse (validation happens
    /// in the config layer before the core runs).
    pub fn compile(&mut self, source: &str, body: bool) -> Producer {
        if !has_template_actions(source) {
            return Producer::Static(source.to_owned());
        }

        let name = format!("field_{}", self.next_id);
        self.next_id += 1;

        let env = if body { &mut self.body_env } else { &mut self.env };
        match env.add_template_owned(name.clone(), source.to_owned()) {
            Ok(()) => Producer::Template { name, body },
            Err(_) => Producer::Static(source.to_owned()),
        }
    }

    /// Renders a producer with the per-request `Values` map as context.
    pub fn render(&self, producer: &Producer, values: &HashMap<String, String>) -> Result<String> {
        match producer {
            Producer::Static(text) => Ok(text.clone()),
            Producer::Template { name, body } => {
                let env = if *body { &self.body_env } else { &self.env };
                let template = env
                    .get_template(name)
                    .map_err(|e| Error::TemplateRender(e.to_string()))?;
                template
                    .render(context! { Values => values })
                    .map_err(|e| Error::TemplateRender(e.to_string()))
            }
        }
    }
}

/// Parses one rendered `values` block as dotenv-style `KEY=VALUE` lines.
pub fn parse_values_block(rendered: &str) -> Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    for item in dotenvy::from_read_iter(rendered.as_bytes()) {
        let (key, value) = item.map_err(|e| Error::ValuesParse(e.to_string()))?;
        out.insert(key, value);
    }
    Ok(out)
}
