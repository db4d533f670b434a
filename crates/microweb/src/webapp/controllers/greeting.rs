//! `GET /greeting`: a counted greeting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use microweb_core::TargetType;
use microweb_router::{Controller, Mapping, ParamSpec};

/// Greets `name` (default `World`) and numbers each greeting.
#[derive(Debug, Default)]
pub struct GreetingController {
    counter: AtomicU64,
}

impl GreetingController {
    /// Builds the greeting, advancing the counter.
    pub fn greet(&self, name: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("Hola {name} (#{n})")
    }
}

impl Controller for GreetingController {
    fn mappings(self: Arc<Self>) -> Vec<Mapping> {
        vec![Mapping::get("/greeting")
            .named("greeting")
            .param(ParamSpec::query("name", TargetType::String).default_value("World"))
            .text(move |args| Ok(self.greet(args.text(0)?)))]
    }
}
