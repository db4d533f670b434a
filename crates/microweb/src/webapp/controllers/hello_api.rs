//! `GET /hello` and its `/app` and `/api` aliases.

use std::sync::Arc;

use microweb_core::{HandlerResult, TargetType};
use microweb_router::{Controller, Mapping, ParamSpec};
use serde::Serialize;

const PATHS: [&str; 3] = ["/hello", "/app/hello", "/api/hello"];

#[derive(Serialize)]
struct Hello {
    ok: bool,
    message: String,
}

/// JSON greeting used by the static front end.
#[derive(Debug, Default)]
pub struct HelloApiController;

impl HelloApiController {
    /// `{"ok":true,"message":"Hola {name}"}`.
    pub fn hello(name: &str) -> HandlerResult<String> {
        let body = Hello {
            ok: true,
            message: format!("Hola {name}"),
        };
        Ok(serde_json::to_string(&body)?)
    }
}

impl Controller for HelloApiController {
    fn mappings(self: Arc<Self>) -> Vec<Mapping> {
        PATHS
            .into_iter()
            .map(|path| {
                Mapping::get(path)
                    .named("hello")
                    .param(ParamSpec::query("name", TargetType::String).default_value("World"))
                    .text(|args| Self::hello(args.text(0)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_body() {
        assert_eq!(
            HelloApiController::hello("Ada").unwrap(),
            r#"{"ok":true,"message":"Hola Ada"}"#
        );
    }

    #[test]
    fn test_hello_escapes_quotes() {
        let body = HelloApiController::hello("\"x\"").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["message"], "Hola \"x\"");
    }

    #[test]
    fn test_three_paths() {
        let mappings = Arc::new(HelloApiController).mappings();
        let paths: Vec<&str> = mappings.iter().map(Mapping::path).collect();
        assert_eq!(paths, PATHS);
    }
}
