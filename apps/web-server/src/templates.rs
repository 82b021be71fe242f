//! HTML templates.
//!
//! Templates are read once from `templates/` (or `TEMPLATES_DIR`) on first use.
//! Autoescaping is on for every `.html` template.

use std::collections::HashMap;
use std::error::Error as _;
use std::sync::LazyLock;

use tera::{Context, Tera, Value};

use crate::middleware::auth::Identity;

static TEMPLATES: LazyLock<Result<Tera, String>> = LazyLock::new(load);

fn load() -> Result<Tera, String> {
    let dir = std::env::var("TEMPLATES_DIR")
        .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string());
    let mut tera = Tera::new(&format!("{dir}/**/*.html")).map_err(|e| describe(&e))?;
    tera.register_filter("linebreaksbr", linebreaksbr);
    tracing::debug!(dir = %dir, count = tera.get_template_names().count(), "Templates loaded");
    Ok(tera)
}

/// Load and parse every template, reporting the first failure.
pub fn init() -> Result<(), String> {
    TEMPLATES.as_ref().map(|_| ()).map_err(Clone::clone)
}

pub fn render(name: &str, context: &Context) -> Result<String, String> {
    let tera = TEMPLATES.as_ref().map_err(Clone::clone)?;
    tera.render(name, context).map_err(|e| describe(&e))
}

/// Context every page starts from: the current viewer, if any.
pub fn base_context(viewer: Option<&Identity>) -> Context {
    let mut context = Context::new();
    context.insert("user", &viewer);
    context
}

/// Tera hides the useful part of an error in its source chain.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

/// Newlines to `<br>`. Escape before applying.
fn linebreaksbr(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("linebreaksbr expects a string"))?;
    Ok(Value::String(
        text.replace("\r\n", "\n").replace('\n', "<br>"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_parse() {
        init().unwrap();
    }

    #[test]
    fn test_linebreaksbr() {
        let value = linebreaksbr(&Value::from("one\r\ntwo\nthree"), &HashMap::new()).unwrap();
        assert_eq!(value, Value::from("one<br>two<br>three"));
        assert!(linebreaksbr(&Value::from(3), &HashMap::new()).is_err());
    }

    #[test]
    fn test_missing_template() {
        let err = render("posts/nope.html", &Context::new()).unwrap_err();
        assert!(err.contains("posts/nope.html"));
    }
}
