//! HTTP transport tests against a live grid server.
//!
//! The router is served on an ephemeral loopback port and driven through
//! [`HttpTransport`] and a [`GridController`].

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tablegrid::client::{GridBody, GridController, GridTransport, HttpTransport, MemoryPreferences};
use tablegrid::http::{GridState, router};
use tablegrid::{
    DataProvider, Error, GridConfig, GridRequest, SqliteGridBackend, TableRegistry, TableSource,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn products_app() -> Router {
    let backend = SqliteGridBackend::in_memory().unwrap();
    let mut sql =
        String::from("CREATE TABLE products (id INTEGER PRIMARY KEY, name TEXT, price REAL);");
    for i in 1..=24 {
        sql.push_str(&format!(
            "INSERT INTO products (name, price) VALUES ('item{i:02}', {i}.25);"
        ));
    }
    sql.push_str("INSERT INTO products (name, price) VALUES ('100% cotton', 9.0);");
    backend.execute_batch(&sql).unwrap();

    let mut registry = TableRegistry::new();
    registry
        .register(
            TableSource::new("products", "products", strings(&["id", "name", "price"]))
                .with_searchable(strings(&["name"]))
                .with_sortable(strings(&["id", "price"])),
            GridConfig::new("products")
                .add_field("id", "ID")
                .add_field("name", "Name")
                .add_field("price", "Price")
                .add_sortable("id")
                .add_sortable("price"),
        )
        .unwrap();

    let provider = DataProvider::new(Arc::new(backend));
    router(GridState::new(registry, provider, false), "/api/table")
        .unwrap()
        .route("/plain", get(|| async { "this is not json" }))
        .route("/plain/config", get(|| async { "this is not json" }))
}

/// Serves the app on `127.0.0.1:0` and returns its base URL.
async fn spawn_server() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, products_app()).await.unwrap();
    });
    (format!("http://{addr}"), handle)
}

#[tokio::test]
async fn test_fetch_success_page() {
    let (base, server) = spawn_server().await;
    let transport = HttpTransport::new(&format!("{base}/api/table")).unwrap();

    let mut request = GridRequest::new("products", 10);
    request.page = 3;
    let response = transport.fetch(&request).await.unwrap();

    assert!(response.success);
    assert_eq!(response.total_records, 25);
    assert_eq!(response.total_pages, 3);
    let ids: Vec<i64> = response
        .data
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![21, 22, 23, 24, 25]);

    server.abort();
}

#[tokio::test]
async fn test_fetch_unknown_table_decodes_failure_envelope() {
    let (base, server) = spawn_server().await;
    let transport = HttpTransport::new(&format!("{base}/api/table")).unwrap();

    let response = transport.fetch(&GridRequest::new("nope", 10)).await.unwrap();

    assert!(!response.success);
    assert!(response.data.is_none());
    assert!(response.message.unwrap().contains("nope"));

    server.abort();
}

#[tokio::test]
async fn test_fetch_non_json_reply_is_transport_error() {
    let (base, server) = spawn_server().await;
    let transport = HttpTransport::new(&format!("{base}/plain")).unwrap();

    let err = transport
        .fetch(&GridRequest::new("products", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));

    server.abort();
}

#[tokio::test]
async fn test_fetch_config_appends_config_segment() {
    let (base, server) = spawn_server().await;

    for endpoint in [format!("{base}/api/table"), format!("{base}/api/table/")] {
        let transport = HttpTransport::new(&endpoint).unwrap();
        let config = transport.fetch_config("products").await.unwrap();
        assert_eq!(config.table_id, "products");
        assert_eq!(config.columns, vec!["id", "name", "price"]);
        assert!(config.is_sortable("price"));
    }

    server.abort();
}

#[tokio::test]
async fn test_fetch_config_unknown_table() {
    let (base, server) = spawn_server().await;
    let transport = HttpTransport::new(&format!("{base}/api/table")).unwrap();

    let err = transport.fetch_config("nope").await.unwrap_err();
    assert!(matches!(err, Error::UnknownTable(ref id) if id == "nope"));

    server.abort();
}

#[tokio::test]
async fn test_fetch_config_non_json_reply_is_transport_error() {
    let (base, server) = spawn_server().await;
    let transport = HttpTransport::new(&format!("{base}/plain")).unwrap();

    let err = transport.fetch_config("products").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));

    server.abort();
}

#[tokio::test]
async fn test_controller_over_http() {
    let (base, server) = spawn_server().await;
    let transport = HttpTransport::new(&format!("{base}/api/table")).unwrap();
    let config = transport.fetch_config("products").await.unwrap();
    let controller = GridController::new(config, transport, MemoryPreferences::new()).unwrap();

    assert!(controller.load().await);
    assert_eq!(controller.view().records_info, "Showing 1–10 / 25");

    controller.with_session(|s| {
        s.set_search_text("100%");
        s.set_page(1);
    });
    assert!(controller.load().await);
    let view = controller.view();
    let table = view.table().unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(view.records_info, "Showing 1–1 / 1");

    controller.with_session(|s| {
        s.set_search_text("");
        s.set_page(9);
    });
    assert!(controller.load().await);
    let view = controller.view();
    assert!(matches!(view.body, GridBody::Empty { .. }));
    assert_eq!(view.records_info, "Showing 0–0 / 0");

    server.abort();
}
