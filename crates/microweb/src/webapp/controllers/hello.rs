//! `GET /`: the landing greeting.

use std::sync::Arc;

use microweb_router::{Controller, Mapping};

/// Body of `GET /`.
pub const GREETING: &str = "Greetings from microweb!";

/// Answers the root path.
#[derive(Debug, Default)]
pub struct HelloController;

impl Controller for HelloController {
    fn mappings(self: Arc<Self>) -> Vec<Mapping> {
        vec![Mapping::get("/").named("index").text(|_| Ok(GREETING.to_string()))]
    }
}
