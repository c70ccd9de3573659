use super::client::SearchClient;
use super::error::SearchError;
use super::page::{Page, PageLocation};
use super::query::QueryParameters;
use crate::sdk::config::{InteractionMode, SearchConfig};
use crate::sdk::map::{MapCanvas, ResultRenderer};
use crate::sdk::response::SearchResponse;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

/// Where the current page view is in the submit → fetch → render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Submitting,
    Rendered,
    ErrorShown,
    /// The form was handed off to the results page.
    Navigated,
}

pub type SearchOutcome = Result<SearchResponse, SearchError>;

/// Turns user queries into requests and successful responses into map renders.
///
/// Runs on a single thread. The renderer is shared through `Rc<RefCell<_>>` and borrowed
/// only for the synchronous render step, so overlapping searches each render when their
/// response arrives.
pub struct SearchOrchestrator<C: MapCanvas, P: Page> {
    client: SearchClient,
    renderer: Rc<RefCell<ResultRenderer<C>>>,
    page: P,
    config: SearchConfig,
    phase: Cell<SearchPhase>,
}

impl<C: MapCanvas, P: Page> SearchOrchestrator<C, P> {
    pub fn new(client: SearchClient, renderer: ResultRenderer<C>, page: P, config: SearchConfig) -> Self {
        Self {
            client,
            renderer: Rc::new(RefCell::new(renderer)),
            page,
            config,
            phase: Cell::new(SearchPhase::Idle),
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase.get()
    }

    pub fn renderer(&self) -> Ref<'_, ResultRenderer<C>> {
        self.renderer.borrow()
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Handles a form submission using the configured interaction mode.
    pub async fn submit_form<I, K, V>(&self, fields: I) -> SearchPhase
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let query = QueryParameters::from_fields(fields);
        match self.config.mode {
            InteractionMode::FetchInPlace => self.fetch_and_render(&query).await,
            InteractionMode::Navigate => {
                self.submit_and_navigate(&query);
                self.phase()
            }
        }
    }

    /// Sends the browser to the results view; the fetch happens when that page loads.
    pub fn submit_and_navigate(&self, query: &QueryParameters) {
        let target = format!("{}?{}", self.config.results_path, query.to_query_string());
        log::info!("Navigating to results view {}", target);
        self.page.navigate(&target);
        self.phase.set(SearchPhase::Navigated);
    }

    /// Fetches results for `query` and renders them in place.
    pub async fn fetch_and_render(&self, query: &QueryParameters) -> SearchPhase {
        self.phase.set(SearchPhase::Submitting);
        let outcome: SearchOutcome = self.client.search(query).await;
        self.settle(outcome)
    }

    fn settle(&self, outcome: SearchOutcome) -> SearchPhase {
        let phase = match outcome {
            Ok(response) => {
                log::info!(
                    "Search returned {} features",
                    response.geo_features.len()
                );
                self.render(Some(&response));
                SearchPhase::Rendered
            }
            Err(e) => {
                log::error!("Search failed ({}): {}", e.kind(), e);
                self.page.alert(&e.user_message());
                SearchPhase::ErrorShown
            }
        };
        self.phase.set(phase);
        phase
    }

    /// Page-load trigger: a results page that carries a query fetches it.
    /// Returns `None` when the page is not a results page with parameters.
    pub async fn on_page_load(&self, location: &PageLocation) -> Option<SearchPhase> {
        let results_root = self.config.results_path.trim_end_matches('/');
        if !location.path.starts_with(results_root) || !location.has_query {
            log::debug!("No search to run for {}", location.path);
            return None;
        }
        Some(self.fetch_and_render(&location.query).await)
    }

    /// Renders a payload embedded in a server-rendered page.
    pub fn render_embedded(&self, json: &str) {
        let response = match SearchResponse::from_json(json) {
            Ok(response) => Some(response),
            Err(e) => {
                log::error!("[RENDER] Embedded results are not valid JSON: {}", e);
                None
            }
        };
        self.render(response.as_ref());
    }

    fn render(&self, response: Option<&SearchResponse>) {
        match self.renderer.try_borrow_mut() {
            Ok(mut renderer) => renderer.render(response),
            Err(e) => log::error!("[RENDER] Map is borrowed elsewhere, skipping render: {}", e),
        }
    }

    /// The reset control: back to the start page.
    pub fn reset(&self) {
        log::info!("Resetting search");
        self.page.navigate(&self.config.reset_path);
        self.phase.set(SearchPhase::Idle);
    }
}
