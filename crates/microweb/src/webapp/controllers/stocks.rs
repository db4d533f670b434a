//! `GET /stocks` and aliases: a deterministic quote.

use std::sync::Arc;

use microweb_core::{HandlerResult, RequestContext, ResponseContext, TargetType};
use microweb_router::{Args, Controller, Mapping, ParamSpec};

const PATHS: [&str; 4] = ["/stocks", "/api/stocks", "/app/stocks", "/stock"];

/// Query keys accepted for the symbol, in priority order.
pub const SYMBOL_KEYS: [&str; 4] = ["symbol", "stockSymbol", "ticker", "s"];

/// Symbol quoted when none is given.
pub const DEFAULT_SYMBOL: &str = "AAPL";

const NO_CACHE: &str = "no-store, no-cache, must-revalidate";

/// Quotes a price for the first non-blank symbol key.
#[derive(Debug, Default)]
pub struct StocksApiController;

impl StocksApiController {
    /// Picks the symbol: the first non-blank declared key, then `q` from
    /// the raw query, then [`DEFAULT_SYMBOL`]. Empty and whitespace-only
    /// values count as blank and are skipped. Case is kept.
    pub fn choose_symbol(candidates: &[&str], request: &RequestContext) -> String {
        candidates
            .iter()
            .copied()
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                request
                    .query_values()
                    .get("q")
                    .filter(|q| !q.trim().is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
    }

    /// Deterministic price in `[100.0, 149.9]` for the upper-cased symbol.
    #[must_use]
    pub fn price(symbol: &str) -> f64 {
        let hash = symbol_hash(&symbol.to_uppercase());
        100.0 + f64::from((hash % 500).unsigned_abs()) / 10.0
    }

    /// Renders the quote body.
    pub fn quote(symbol: &str) -> HandlerResult<String> {
        Ok(format!(
            r#"{{"ok":true,"symbol":{},"price":{:.2},"currency":"USD"}}"#,
            serde_json::to_string(symbol)?,
            Self::price(symbol)
        ))
    }

    fn handle(args: &Args<'_>) -> HandlerResult<String> {
        let request = args.request(0)?;
        let response = args.response(1)?;
        mark_uncached_json(response);

        let candidates = (0..SYMBOL_KEYS.len())
            .map(|i| args.text(i + 2))
            .collect::<HandlerResult<Vec<&str>>>()?;
        Self::quote(&Self::choose_symbol(&candidates, request))
    }
}

fn mark_uncached_json(response: &ResponseContext) {
    response.set_content_type("application/json");
    response.set_header("Cache-Control", NO_CACHE);
}

/// 31-based polynomial hash over UTF-16 code units, wrapping at 32 bits.
fn symbol_hash(symbol: &str) -> i32 {
    symbol
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

impl Controller for StocksApiController {
    fn mappings(self: Arc<Self>) -> Vec<Mapping> {
        PATHS
            .into_iter()
            .map(|path| {
                Mapping::get(path)
                    .named("quote")
                    .param(ParamSpec::request())
                    .param(ParamSpec::response())
                    .params(
                        SYMBOL_KEYS
                            .iter()
                            .map(|key| ParamSpec::query(*key, TargetType::String).default_value("")),
                    )
                    .text(Self::handle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_hash_is_stable() {
        assert_eq!(symbol_hash(""), 0);
        assert_eq!(symbol_hash("A"), 65);
        assert_eq!(symbol_hash("AB"), 65 * 31 + 66);
    }

    #[test]
    fn test_price_is_case_insensitive_and_in_range() {
        let ibm = StocksApiController::price("ibm");
        assert!((ibm - StocksApiController::price("IBM")).abs() < f64::EPSILON);
        for symbol in ["AAPL", "MSFT", "GOOG", "x", "ÄÖÜ"] {
            let price = StocksApiController::price(symbol);
            assert!((100.0..150.0).contains(&price), "{symbol}: {price}");
        }
    }

    #[test]
    fn test_quote_body() {
        let body = StocksApiController::quote("ibm").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["ok"], true);
        assert_eq!(parsed["symbol"], "ibm");
        assert_eq!(parsed["currency"], "USD");
        assert!(body.contains(&format!("\"price\":{:.2}", StocksApiController::price("IBM"))));
    }

    #[test]
    fn test_choose_symbol_priority() {
        let request = RequestContext::get("/stocks?q=TSLA");
        assert_eq!(StocksApiController::choose_symbol(&["", "msft", "x", ""], &request), "msft");
        assert_eq!(StocksApiController::choose_symbol(&[" ", "", "", ""], &request), "TSLA");

        let bare = RequestContext::get("/stocks");
        assert_eq!(StocksApiController::choose_symbol(&["", "", "", ""], &bare), DEFAULT_SYMBOL);
    }

    #[test]
    fn test_choose_symbol_skips_whitespace_only_values() {
        let request = RequestContext::get("/stocks?q=%20%09");
        assert_eq!(
            StocksApiController::choose_symbol(&["\t", " \n", "  ", "ibm "], &request),
            "ibm "
        );
        assert_eq!(
            StocksApiController::choose_symbol(&[" ", "\t", "", ""], &request),
            DEFAULT_SYMBOL
        );
    }

    #[test]
    fn test_mappings_declare_contexts_then_keys() {
        let mappings = Arc::new(StocksApiController).mappings();
        assert_eq!(mappings.len(), PATHS.len());
        let specs = mappings[0].param_specs();
        assert_eq!(specs.len(), 2 + SYMBOL_KEYS.len());
        assert_eq!(specs[2].query_key(), Some("symbol"));
        assert_eq!(specs[5].declared_default(), Some(""));
    }
}
