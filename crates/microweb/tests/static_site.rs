//! Static file fallback behind the route table.

use std::fs;
use std::path::{Path, PathBuf};

use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::BodyExt;
use tempfile::TempDir;

use microweb::config::MicrowebConfig;
use microweb::core::RequestContext;
use microweb::server::{HttpResponse, Server};
use microweb::Bootstrap;

fn site() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>site</h1>").unwrap();
    fs::create_dir(dir.path().join("css")).unwrap();
    fs::write(dir.path().join("css/styles.css"), "body{}").unwrap();
    // Routes win over files with the same path.
    fs::write(dir.path().join("greeting"), "file").unwrap();
    dir
}

fn app(root: &Path) -> Server {
    let mut config = MicrowebConfig::default();
    config.static_files.root = root.display().to_string();
    config.static_files.cache_max_age_secs = 60;
    let (server, _) = Bootstrap::new(config).build_server().unwrap();
    server
}

async fn body(response: HttpResponse) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn files_are_served_when_no_route_matches() {
    let dir = site();
    let server = app(dir.path());

    let response = server.handle(&RequestContext::get("/css/styles.css"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/css; charset=utf-8");
    assert_eq!(response.headers()[CACHE_CONTROL], "max-age=60");
    assert_eq!(body(response).await, "body{}");
}

#[tokio::test]
async fn directory_requests_use_the_index_file() {
    let dir = site();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/index.html"), "docs").unwrap();
    let server = app(dir.path());

    let response = server.handle(&RequestContext::get("/docs/"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await, "docs");
}

#[tokio::test]
async fn routes_take_precedence_over_files() {
    let dir = site();
    let server = app(dir.path());

    let response = server.handle(&RequestContext::get("/greeting"));
    assert_eq!(body(response).await, "Hola World (#1)");

    // "/" is bound by the hello controller, so the index page is not used.
    let response = server.handle(&RequestContext::get("/"));
    assert_eq!(body(response).await, "Greetings from microweb!");
}

#[tokio::test]
async fn missing_files_fall_through_to_not_found() {
    let dir = site();
    let server = app(dir.path());

    let response = server.handle(&RequestContext::get("/nope.txt"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(response).await, "404 Not Found");
}

#[tokio::test]
async fn traversal_is_refused() {
    let dir = site();
    let server = app(dir.path());

    let response = server.handle(&RequestContext::get("/../Cargo.toml"));
    assert!(response.status().is_client_error());
}

#[test]
fn bundled_site_is_complete() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../static");
    for file in ["index.html", "css/styles.css", "js/app.js", "images/logo.svg"] {
        assert!(root.join(file).is_file(), "missing static/{file}");
    }

    let script = fs::read_to_string(root.join("js/app.js")).unwrap();
    assert!(script.contains("/app/hello"));
    assert!(script.contains("/app/stocks"));
}
