use super::*;
use crate::config::{ApiConfig, Config};
use crate::document::NodeType;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILE_KEY: &str = "FILEKEY";

fn resolver_for(server: &MockServer) -> (Resolver, broadcast::Receiver<Event>) {
    let config = Config {
        api: ApiConfig {
            api_token: "figd_test".to_string(),
            file_key: FILE_KEY.to_string(),
            base_url: server.uri(),
            ..ApiConfig::default()
        },
        ..Config::default()
    };
    let client = FigmaClient::new(&config).expect("client");
    let (tx, rx) = broadcast::channel(256);
    (Resolver::new(client, tx), rx)
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn refs(tokens: &[&str]) -> Vec<ImageReference> {
    tokens.iter().map(|t| ImageReference::from(*t)).collect()
}

fn export_node(id: &str, name: &str) -> ExportableNode {
    ExportableNode {
        id: id.to_string(),
        name: name.to_string(),
        node_type: NodeType::Component,
    }
}

fn images_body(entries: &[(&str, Option<&str>)]) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(id, url)| {
            (
                (*id).to_string(),
                url.map_or(serde_json::Value::Null, |u| {
                    serde_json::Value::String(u.to_string())
                }),
            )
        })
        .collect();
    serde_json::json!({"err": null, "images": map})
}

// ---------------------------------------------------------------------------
// Bitmap path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bitmap_path_filters_dedups_and_issues_one_request() {
    let server = MockServer::start().await;
    // The deduplicated set is ordered, so the ids parameter is exact.
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .and(query_param("ids", "a:1,b-2"))
        .and(query_param("format", "png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(images_body(&[
            ("a:1", Some("https://cdn.example.com/a.png")),
            ("b-2", Some("https://cdn.example.com/b.png")),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (resolver, mut rx) = resolver_for(&server);
    let images = resolver
        .resolve_bitmaps(FILE_KEY, &refs(&["a:1", "a:1", "b-2", "bad"]))
        .await
        .expect("resolution should succeed");

    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|i| i.name.is_none() && i.id.is_none()));

    let events = drain(&mut rx);
    assert!(
        matches!(
            events.as_slice(),
            [Event::InvalidReferenceSkipped { reference }] if reference == "bad"
        ),
        "exactly the separator-less token is discarded, got {events:?}"
    );
}

#[tokio::test]
async fn bitmap_path_makes_no_request_when_everything_is_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(images_body(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let (resolver, mut rx) = resolver_for(&server);
    let images = resolver
        .resolve_bitmaps(FILE_KEY, &refs(&["nosep", "alsobad"]))
        .await
        .expect("empty result is a success");

    assert!(images.is_empty());
    assert_eq!(drain(&mut rx).len(), 2);
}

#[tokio::test]
async fn bitmap_path_skips_missing_and_null_urls_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(images_body(&[
            ("a:1", Some("https://cdn.example.com/a.png")),
            ("b:2", None),
            // c:3 entirely absent from the response
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (resolver, mut rx) = resolver_for(&server);
    let images = resolver
        .resolve_bitmaps(FILE_KEY, &refs(&["a:1", "b:2", "c:3"]))
        .await
        .expect("per-id misses are not errors");

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].url, "https://cdn.example.com/a.png");

    let missed: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::UrlUnavailable { id } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(missed, vec!["b:2".to_string(), "c:3".to_string()]);
}

#[tokio::test]
async fn bitmap_path_propagates_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (resolver, _rx) = resolver_for(&server);
    let err = resolver
        .resolve_bitmaps(FILE_KEY, &refs(&["a:1"]))
        .await
        .expect_err("transport failure must propagate");
    assert!(err.is_transport());
}

// ---------------------------------------------------------------------------
// Export path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_path_requests_scale_two_and_keeps_node_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .and(query_param("ids", "1:2"))
        .and(query_param("format", "png"))
        .and(query_param("scale", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(images_body(&[("1:2", Some("https://cdn.example.com/c.png"))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (resolver, _rx) = resolver_for(&server);
    let images = resolver
        .resolve_exports(FILE_KEY, &[export_node("1:2", "Search Icon")])
        .await
        .expect("export resolution should succeed");

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].url, "https://cdn.example.com/c.png");
    assert_eq!(images[0].name.as_deref(), Some("Search Icon"));
    assert_eq!(images[0].id.as_deref(), Some("1:2"));
}

#[tokio::test]
async fn export_path_truncates_to_the_batch_ceiling_in_discovery_order() {
    let nodes: Vec<ExportableNode> = (0..150)
        .map(|i| export_node(&format!("1:{i}"), &format!("Node {i}")))
        .collect();
    let expected_ids: Vec<String> = (0..100).map(|i| format!("1:{i}")).collect();

    let server = MockServer::start().await;
    let body = images_body(
        &expected_ids
            .iter()
            .map(|id| (id.as_str(), Some("https://cdn.example.com/x.png")))
            .collect::<Vec<_>>(),
    );
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .and(query_param("ids", expected_ids.join(",")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let (resolver, mut rx) = resolver_for(&server);
    let images = resolver
        .resolve_exports(FILE_KEY, &nodes)
        .await
        .expect("truncated resolution should succeed");

    assert_eq!(images.len(), 100);
    assert_eq!(images[0].id.as_deref(), Some("1:0"));
    assert_eq!(images[99].id.as_deref(), Some("1:99"));

    let events = drain(&mut rx);
    assert!(
        matches!(
            events.as_slice(),
            [Event::ExportBatchTruncated { total: 150, kept: 100 }]
        ),
        "truncation must be observable, got {events:?}"
    );
}

#[tokio::test]
async fn export_path_filters_ids_without_separator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .and(query_param("ids", "1:2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(images_body(&[("1:2", Some("https://cdn.example.com/a.png"))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (resolver, mut rx) = resolver_for(&server);
    let images = resolver
        .resolve_exports(
            FILE_KEY,
            &[export_node("1:2", "Kept"), export_node("badid", "Dropped")],
        )
        .await
        .expect("resolution should succeed");

    assert_eq!(images.len(), 1);
    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [Event::InvalidNodeSkipped { id, .. }] if id == "badid"
    ));
}

#[tokio::test]
async fn export_path_makes_no_request_when_everything_is_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(images_body(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let (resolver, _rx) = resolver_for(&server);
    let images = resolver
        .resolve_exports(FILE_KEY, &[export_node("plain", "No separator")])
        .await
        .expect("empty result is a success");
    assert!(images.is_empty());
}

// ---------------------------------------------------------------------------
// collect_downloadables
// ---------------------------------------------------------------------------

fn doc_with_bitmap_and_component() -> DocumentNode {
    serde_json::from_value(serde_json::json!({
        "id": "0:0",
        "type": "DOCUMENT",
        "children": [{
            "id": "1:0",
            "name": "Page",
            "type": "CANVAS",
            "children": [
                {
                    "id": "1:1",
                    "name": "Photo",
                    "type": "RECTANGLE",
                    "fills": [{"type": "IMAGE", "imageRef": "ref:1"}]
                },
                {"id": "1:2", "name": "Logo", "type": "COMPONENT"}
            ]
        }]
    }))
    .expect("valid document json")
}

#[tokio::test]
async fn collect_orders_bitmap_urls_before_export_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .and(query_param("ids", "ref:1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(images_body(&[("ref:1", Some("https://cdn.example.com/bitmap.png"))])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .and(query_param("ids", "1:2"))
        .and(query_param("scale", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(images_body(&[("1:2", Some("https://cdn.example.com/export.png"))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (resolver, _rx) = resolver_for(&server);
    let images = resolver
        .collect_downloadables(FILE_KEY, &doc_with_bitmap_and_component())
        .await
        .expect("collection should succeed");

    let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://cdn.example.com/bitmap.png",
            "https://cdn.example.com/export.png"
        ]
    );
    assert!(images[0].name.is_none());
    assert_eq!(images[1].name.as_deref(), Some("Logo"));
}

#[tokio::test]
async fn collect_issues_no_calls_for_an_empty_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(images_body(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let document: DocumentNode = serde_json::from_value(serde_json::json!({
        "id": "0:0",
        "type": "DOCUMENT",
        "children": [{"id": "1:0", "name": "Empty page", "type": "CANVAS"}]
    }))
    .expect("valid document json");

    let (resolver, _rx) = resolver_for(&server);
    let images = resolver
        .collect_downloadables(FILE_KEY, &document)
        .await
        .expect("zero discovered images is a success");
    assert!(images.is_empty());
}

#[tokio::test]
async fn collect_propagates_bitmap_path_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{FILE_KEY}")))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (resolver, _rx) = resolver_for(&server);
    let err = resolver
        .collect_downloadables(FILE_KEY, &doc_with_bitmap_and_component())
        .await
        .expect_err("transport failure must fail the collection");
    assert!(err.is_transport());
}
