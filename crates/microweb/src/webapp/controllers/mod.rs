//! The demo application's controllers.

mod greeting;
mod hello;
mod hello_api;
mod stocks;

pub use greeting::GreetingController;
pub use hello::{HelloController, GREETING};
pub use hello_api::HelloApiController;
pub use stocks::{StocksApiController, DEFAULT_SYMBOL, SYMBOL_KEYS};
