use axum::http::{HeaderMap, Method, header::CONTENT_TYPE};
use jsql_core::{Args, Result};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use url::form_urlencoded;

/// How the body of a request carries arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Nothing to read, either the method has no body or the content type is not understood.
    Ignored,
    Json,
    Form,
}

impl BodyKind {
    /// Only `POST` and `PUT` bodies are inspected, `PATCH` ones just when url
    /// encoded. A missing content type means `application/octet-stream`.
    pub fn of(method: &Method, headers: &HeaderMap) -> Self {
        let patch = method == Method::PATCH;
        if method != Method::POST && method != Method::PUT && !patch {
            return BodyKind::Ignored;
        }
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream");
        let media_type = content_type.split(';').next().unwrap_or_default().trim();
        if media_type.eq_ignore_ascii_case("application/json") && !patch {
            BodyKind::Json
        } else if media_type.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            BodyKind::Form
        } else {
            BodyKind::Ignored
        }
    }
}

/// Every value of a request a placeholder can be bound to.
///
/// Lookups follow this precedence: path variables, then form values (body
/// first, then query string) unless empty, then the members of the JSON body.
#[derive(Default, Debug, Clone)]
pub struct RequestArgs {
    pub path: HashMap<String, String>,
    pub form: Vec<(String, String)>,
    pub json: Map<String, JsonValue>,
}

impl RequestArgs {
    /// Appends the pairs of an `application/x-www-form-urlencoded` text.
    pub fn extend_form(&mut self, encoded: &[u8]) {
        self.form.extend(
            form_urlencoded::parse(encoded).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    /// Decodes a JSON object body. An empty body is not an error and carries no value.
    pub fn set_json(&mut self, body: &[u8]) -> Result<()> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        self.json = serde_json::from_slice(body)?;
        Ok(())
    }

    /// First form value of `name`, if any.
    fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Arguments for the placeholder `names`. Names found nowhere are left out and bind NULL.
    pub fn resolve(&self, names: &[String]) -> Args {
        let mut args = Args::new();
        for name in names {
            if args.contains(name) {
                continue;
            }
            if let Some(value) = self.path.get(name) {
                args.insert(name.as_str(), value.as_str());
            } else if let Some(value) = self.form_value(name)
                && !value.is_empty()
            {
                args.insert(name.as_str(), value);
            } else if let Some(value) = self.json.get(name) {
                args.insert(name.as_str(), value.clone());
            }
        }
        args
    }
}

