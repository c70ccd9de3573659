use geosearch_map::sdk::map::{MemoryCanvas, RendererConfig, ResultRenderer};
use geosearch_map::sdk::search::{Page, SearchClient, SearchOrchestrator, SearchPhase};
use geosearch_map::{InteractionMode, MapCanvas, SearchConfig};
use serde_json::json;
use std::cell::RefCell;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingPage {
    alerts: RefCell<Vec<String>>,
    navigations: RefCell<Vec<String>>,
}

impl Page for RecordingPage {
    fn navigate(&self, target: &str) {
        self.navigations.borrow_mut().push(target.to_string());
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

#[tokio::test]
async fn submit_fetch_and_render_cafes_near_paris() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query/"))
        .and(query_param("q", "cafes"))
        .and(query_param("lat", "48.85"))
        .and(query_param("lng", "2.35"))
        .and(query_param("radius", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "geoJSON": {"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.3325, 48.8540]},
                 "properties": {"name": "Cafe de Flore"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.3330, 48.8542]},
                 "properties": {"name": "Les Deux Magots"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.3400, 48.8500]},
                 "properties": {"name": "Le Procope"}}
            ]},
            "search_center": {"lat": 48.85, "lng": 2.35},
            "radius_km": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = SearchConfig {
        base_url: server.uri(),
        mode: InteractionMode::FetchInPlace,
        ..SearchConfig::default()
    };
    let renderer_config = RendererConfig::default();
    let canvas = MemoryCanvas::new(1024, 768, renderer_config.default_view);
    let client = SearchClient::new(&config.base_url, &config.query_path).unwrap();
    let orchestrator = SearchOrchestrator::new(
        client,
        ResultRenderer::new(canvas, renderer_config),
        RecordingPage::default(),
        config,
    );

    let phase = orchestrator
        .submit_form([("q", "cafes"), ("lat", "48.85"), ("lng", "2.35"), ("radius", "5")])
        .await;
    assert_eq!(phase, SearchPhase::Rendered);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/query/");
    assert_eq!(
        requests[0].url.query(),
        Some("q=cafes&lat=48.85&lng=2.35&radius=5")
    );

    let renderer = orchestrator.renderer();
    let canvas = renderer.canvas();
    let marker_layers = canvas.marker_layers();
    assert_eq!(marker_layers.len(), 1);
    assert_eq!(marker_layers[0].len(), 3);
    let circles = canvas.circles();
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0].radius_m, 5000.0);

    assert!(orchestrator.page().alerts.borrow().is_empty());
    assert!(orchestrator.page().navigations.borrow().is_empty());
}

#[tokio::test]
async fn second_search_replaces_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query/"))
        .and(query_param("city", "rome"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "geoJSON": {"features": [
                {"geometry": {"type": "Point", "coordinates": [12.49, 41.89]}, "properties": {"name": "Colosseo"}}
            ]},
            "search_center": {"lat": 41.89, "lng": 12.49},
            "radius_km": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/query/"))
        .and(query_param("city", "nowhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "geoJSON": {"features": []}
        })))
        .mount(&server)
        .await;

    let config = SearchConfig {
        base_url: server.uri(),
        ..SearchConfig::default()
    };
    let renderer_config = RendererConfig::default();
    let default_view = renderer_config.default_view;
    let canvas = MemoryCanvas::new(800, 600, default_view);
    let client = SearchClient::new(&config.base_url, &config.query_path).unwrap();
    let orchestrator = SearchOrchestrator::new(
        client,
        ResultRenderer::new(canvas, renderer_config),
        RecordingPage::default(),
        config,
    );

    orchestrator.submit_form([("city", "rome"), ("radius", "")]).await;
    assert_eq!(orchestrator.renderer().canvas().layers().count(), 2);

    orchestrator.submit_form([("city", "nowhere")]).await;
    let renderer = orchestrator.renderer();
    assert_eq!(renderer.canvas().layers().count(), 0);
    assert_eq!(renderer.canvas().view(), default_view);
}
