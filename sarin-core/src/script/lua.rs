use std::collections::HashMap;

use mlua::{Function, Lua, Table, Value};

use crate::error::{Error, Result};
use crate::request::RequestData;

/// One Lua interpreter holding a user script with a global `transform`
/// function. Owned by a single worker.
///
/// ```lua
/// function transform(req)
///     req.headers["X-Custom"] = {"value"}
///     return req
/// end
/// ```
pub struct LuaEngine {
    lua: Lua,
    transform: Function,
}

impl LuaEngine {
    pub fn new(source: &str) -> Result<Self> {
        let lua = Lua::new();
        lua.load(source).exec()?;

        let transform: Function = lua
            .globals()
            .get("transform")
            .map_err(|_| Error::ScriptTransformMissing)?;

        Ok(LuaEngine { lua, transform })
    }

    /// Runs `transform(req)` and reads the returned table back into `req`.
    /// Fields the script omits stay unchanged.
    pub fn transform(&self, req: &mut RequestData) -> Result<()> {
        let table = self.request_to_table(req)?;
        let result: Value = self.transform.call(table)?;

        let Value::Table(output) = result else {
            return Err(Error::ScriptTransformReturn);
        };

        self.table_to_request(&output, req)?;
        Ok(())
    }

    fn request_to_table(&self, req: &RequestData) -> mlua::Result<Table> {
        let table = self.lua.create_table()?;
        table.set("method", req.method.as_str())?;
        table.set("url", req.url.as_str())?;
        table.set("path", req.path.as_str())?;
        table.set("body", req.body.as_str())?;
        table.set("headers", self.map_to_table(&req.headers)?)?;
        table.set("params", self.map_to_table(&req.params)?)?;
        table.set("cookies", self.map_to_table(&req.cookies)?)?;
        Ok(table)
    }

    fn map_to_table(&self, map: &HashMap<String, Vec<String>>) -> mlua::Result<Table> {
        let table = self.lua.create_table()?;
        for (key, values) in map {
            let array = self
                .lua
                .create_sequence_from(values.iter().map(String::as_str))?;
            table.set(key.as_str(), array)?;
        }
        Ok(table)
    }

    fn table_to_request(&self, table: &Table, req: &mut RequestData) -> mlua::Result<()> {
        if let Value::String(s) = table.get::<Value>("method")? {
            req.method = s.to_string_lossy();
        }
        if let Value::String(s) = table.get::<Value>("url")? {
            req.url = s.to_string_lossy();
        }
        if let Value::String(s) = table.get::<Value>("path")? {
            req.path = s.to_string_lossy();
        }
        if let Value::String(s) = table.get::<Value>("body")? {
            req.body = s.to_string_lossy();
        }
        if let Value::Table(t) = table.get::<Value>("headers")? {
            req.headers = self.table_to_map(&t)?;
        }
        if let Value::Table(t) = table.get::<Value>("params")? {
            req.params = self.table_to_map(&t)?;
        }
        if let Value::Table(t) = table.get::<Value>("cookies")? {
            req.cookies = self.table_to_map(&t)?;
        }
        Ok(())
    }

    /// Accepts both single string values and arrays of strings; a single
    /// string is read back as a one-element list.
    fn table_to_map(&self, table: &Table) -> mlua::Result<HashMap<String, Vec<String>>> {
        let mut map = HashMap::new();
        for pair in table.pairs::<Value, Value>() {
            let (key, value) = pair?;
            let Value::String(key) = key else { continue };
            let key = key.to_string_lossy();

            match value {
                Value::String(s) => {
                    map.insert(key, vec![s.to_string_lossy()]);
                }
                Value::Table(array) => {
                    let mut values = Vec::new();
                    for item in array.sequence_values::<Value>() {
                        if let Value::String(s) = item? {
                            values.push(s.to_string_lossy());
                        }
                    }
                    map.insert(key, values);
                }
                _ => {}
            }
        }
        Ok(map)
    }
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
        req.headers
            .insert("X-Existing".to_owned(), vec!["1".to_owned()]);
        req
    }

    #[test]
    fn mutates_headers_and_method() {
        let engine = LuaEngine::new(
            r#"
function transform(req)
    req.method = "POST"
    req.headers["X-Test"] = {"v"}
    return req
end"#,
        )
        .unwrap();

        let mut req = request();
        engine.transform(&mut req).unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.headers["X-Test"], vec!["v"]);
    }

    #[test]
    fn single_string_value_becomes_one_element_list() {
        let engine = LuaEngine::new(
            r#"
function transform(req)
    req.headers["X-Single"] = "alone"
    return req
end"#,
        )
        .unwrap();

        let mut req = request();
        engine.transform(&mut req).unwrap();
        assert_eq!(req.headers["X-Single"], vec!["alone"]);
    }

    #[test]
    fn omitted_fields_stay_unchanged() {
        let engine = LuaEngine::new(
            r#"
function transform(req)
    return { method = "DELETE" }
end"#,
        )
        .unwrap();

        let mut req = request();
        engine.transform(&mut req).unwrap();
        assert_eq!(req.method, "DELETE");
        assert_eq!(req.body, "body");
        assert_eq!(req.headers["X-Existing"], vec!["1"]);
    }

    #[test]
    fn non_table_return_is_an_error() {
        let engine = LuaEngine::new("function transform(req) return 42 end").unwrap();
        let mut req = request();
        assert!(matches!(
            engine.transform(&mut req),
            Err(Error::ScriptTransformReturn)
        ));
    }

    #[test]
    fn missing_transform_is_rejected() {
        assert!(matches!(
            LuaEngine::new("x = 1"),
            Err(Error::ScriptTransformMissing)
        ));
    }

    #[test]
    fn syntax_error_is_rejected() {
        assert!(LuaEngine::new("function transform(").is_err());
    }

    #[test]
    fn runtime_error_propagates() {
        let engine = LuaEngine::new("function transform(req) error('nope') end").unwrap();
        let mut req = request();
        assert!(engine.transform(&mut req).is_err());
    }
}
