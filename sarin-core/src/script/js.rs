use std::collections::HashMap;

use rquickjs::{Array, CatchResultExt, Context, Ctx, Function, Object, Runtime, Value};

use crate::error::{Error, Result};
use crate::request::RequestData;

/// One QuickJS runtime holding a user script with a global `transform`
/// function. Owned by a single worker.
///
/// ```javascript
/// function transform(req) {
///     req.headers["X-Custom"] = ["value"];
///     return req;
/// }
/// ```
pub struct JsEngine {
    _runtime: Runtime,
    context: Context,
}

impl JsEngine {
    pub fn new(source: &str) -> Result<Self> {
        let runtime = Runtime::new().map_err(js_err)?;
        let context = Context::full(&runtime).map_err(js_err)?;

        context.with(|ctx| -> Result<()> {
            ctx.eval::<(), _>(source)
                .catch(&ctx)
                .map_err(|e| Error::Js(e.to_string()))?;

            let transform: Value = ctx.globals().get("transform").map_err(js_err)?;
            if !transform.is_function() {
                return Err(Error::ScriptTransformMissing);
            }
            Ok(())
        })?;

        Ok(JsEngine {
            _runtime: runtime,
            context,
        })
    }

    /// Runs `transform(req)` and reads the returned object back into `req`.
    /// Fields the script omits stay unchanged.
    pub fn transform(&self, req: &mut RequestData) -> Result<()> {
        self.context.with(|ctx| -> Result<()> {
            let transform: Function = ctx
                .globals()
                .get("transform")
                .map_err(|_| Error::ScriptTransformMissing)?;

            let input = request_to_object(&ctx, req)?;
            let result: Value = transform
                .call((input,))
                .catch(&ctx)
                .map_err(|e| Error::Js(e.to_string()))?;

            let Some(output) = result.as_object() else {
                return Err(Error::ScriptTransformReturn);
            };

            object_to_request(output, req)
        })
    }
}

fn js_err(err: rquickjs::Error) -> Error {
    Error::Js(err.to_string())
}

fn request_to_object<'js>(ctx: &Ctx<'js>, req: &RequestData) -> Result<Object<'js>> {
    let obj = Object::new(ctx.clone()).map_err(js_err)?;
    obj.set("method", req.method.as_str()).map_err(js_err)?;
    obj.set("url", req.url.as_str()).map_err(js_err)?;
    obj.set("path", req.path.as_str()).map_err(js_err)?;
    obj.set("body", req.body.as_str()).map_err(js_err)?;
    obj.set("headers", map_to_object(ctx, &req.headers)?)
        .map_err(js_err)?;
    obj.set("params", map_to_object(ctx, &req.params)?)
        .map_err(js_err)?;
    obj.set("cookies", map_to_object(ctx, &req.cookies)?)
        .map_err(js_err)?;
    Ok(obj)
}

fn map_to_object<'js>(
    ctx: &Ctx<'js>,
    map: &HashMap<String, Vec<String>>,
) -> Result<Object<'js>> {
    let obj = Object::new(ctx.clone()).map_err(js_err)?;
    for (key, values) in map {
        let array = Array::new(ctx.clone()).map_err(js_err)?;
        for (index, value) in values.iter().enumerate() {
            array.set(index, value.as_str()).map_err(js_err)?;
        }
        obj.set(key.as_str(), array).map_err(js_err)?;
    }
    Ok(obj)
}

fn object_to_request(obj: &Object<'_>, req: &mut RequestData) -> Result<()> {
    if let Some(method) = get_string(obj, "method")? {
        req.method = method;
    }
    if let Some(url) = get_string(obj, "url")? {
        req.url = url;
    }
    if let Some(path) = get_string(obj, "path")? {
        req.path = path;
    }
    if let Some(body) = get_string(obj, "body")? {
        req.body = body;
    }
    if let Some(headers) = get_map(obj, "headers")? {
        req.headers = headers;
    }
    if let Some(params) = get_map(obj, "params")? {
        req.params = params;
    }
    if let Some(cookies) = get_map(obj, "cookies")? {
        req.cookies = cookies;
    }
    Ok(())
}

fn get_string(obj: &Object<'_>, key: &str) -> Result<Option<String>> {
    let value: Value = obj.get(key).map_err(js_err)?;
    match value.as_string() {
        Some(s) => Ok(Some(s.to_string().map_err(js_err)?)),
        None => Ok(None),
    }
}

/// Accepts both single string values and arrays of strings; a single
/// string is read back as a one-element list.
fn get_map(obj: &Object<'_>, key: &str) -> Result<Option<HashMap<String, Vec<String>>>> {
    let value: Value = obj.get(key).map_err(js_err)?;
    let Some(object) = value.as_object() else {
        return Ok(None);
    };

    let mut map = HashMap::new();
    for key in object.keys::<String>() {
        let key = key.map_err(js_err)?;
        let entry: Value = object.get(key.as_str()).map_err(js_err)?;

        if let Some(array) = entry.as_array() {
            let mut values = Vec::new();
            for item in array.iter::<Value>() {
                let item = item.map_err(js_err)?;
                if let Some(s) = item.as_string() {
                    values.push(s.to_string().map_err(js_err)?);
                }
            }
            map.insert(key, values);
        } else if let Some(s) = entry.as_string() {
            map.insert(key, vec![s.to_string().map_err(js_err)?]);
        }
    }
    Ok(Some(map))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RequestData {
        let mut req = RequestData {
            method: "GET".to_owned(),
            url: "http://localhost/a".to_owned(),
            path: "/a".to_owned(),
            body: "body".to_owned(),
            ..RequestData::default()
        };
        req.params.insert("q".to_owned(), vec!["1".to_owned()]);
        req
    }

    #[test]
    fn mutates_headers_and_path() {
        let engine = JsEngine::new(
            r#"
function transform(req) {
    req.path = "/changed";
    req.headers["X-Test2"] = ["w"];
    return req;
}"#,
        )
        .unwrap();

        let mut req = request();
        engine.transform(&mut req).unwrap();
        assert_eq!(req.path, "/changed");
        assert_eq!(req.headers["X-Test2"], vec!["w"]);
        assert_eq!(req.params["q"], vec!["1"]);
    }

    #[test]
    fn single_string_value_becomes_one_element_list() {
        let engine = JsEngine::new(
            r#"
function transform(req) {
    req.headers["X-Single"] = "alone";
    return req;
}"#,
        )
        .unwrap();

        let mut req = request();
        engine.transform(&mut req).unwrap();
        assert_eq!(req.headers["X-Single"], vec!["alone"]);
    }

    #[test]
    fn returning_nothing_is_an_error() {
        let engine = JsEngine::new("function transform(req) {}").unwrap();
        let mut req = request();
        assert!(matches!(
            engine.transform(&mut req),
            Err(Error::ScriptTransformReturn)
        ));
    }

    #[test]
    fn returning_null_is_an_error() {
        let engine = JsEngine::new("function transform(req) { return null; }").unwrap();
        let mut req = request();
        assert!(matches!(
            engine.transform(&mut req),
            Err(Error::ScriptTransformReturn)
        ));
    }

    #[test]
    fn missing_transform_is_rejected() {
        assert!(matches!(
            JsEngine::new("var x = 1;"),
            Err(Error::ScriptTransformMissing)
        ));
    }

    #[test]
    fn syntax_error_is_rejected() {
        assert!(JsEngine::new("function transform(").is_err());
    }

    #[test]
    fn runtime_exception_propagates() {
        let engine =
            JsEngine::new("function transform(req) { throw new Error(\"nope\"); }").unwrap();
        let mut req = request();
        assert!(engine.transform(&mut req).is_err());
    }
}
