use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),
    #[error("js error: {0}")]
    Js(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid proxy {url}: {reason}")]
    ProxyBuild { url: String, reason: String },
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("failed to load script from {origin:?}: {reason}")]
    ScriptLoad { origin: String, reason: String },
    #[error("script must define a global 'transform' function")]
    ScriptTransformMissing,
    #[error("transform function must return an object")]
    ScriptTransformReturn,
    #[error("{engine} script[{index}]: {reason}")]
    ScriptChain {
        engine: &'static str,
        index: usize,
        reason: String,
    },
    #[error("template rendering: {0}")]
    TemplateRender(String),
    #[error("invalid method {0:?}")]
    InvalidMethod(String),
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
    #[error("invalid header value for {0:?}")]
    InvalidHeaderValue(String),
    #[error("values rendering: {0}")]
    ValuesParse(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
