use super::error::{ErrorPayload, SearchError};
use super::query::QueryParameters;
use crate::sdk::response::SearchResponse;
use reqwest::Client;

/// Talks to the backend query endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
    query_path: String,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>, query_path: impl Into<String>) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, query_path))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        query_path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            query_path: query_path.into(),
        }
    }

    pub fn query_url(&self, query: &QueryParameters) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, self.query_path)
        } else {
            format!(
                "{}{}?{}",
                self.base_url,
                self.query_path,
                query.to_query_string()
            )
        }
    }

    pub async fn search(&self, query: &QueryParameters) -> Result<SearchResponse, SearchError> {
        let url = self.query_url(query);
        log::debug!("[SEARCH] GET {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("[SEARCH] Transport failure. URL: {}\nError: {}", url, e);
                return Err(SearchError::Transport(e));
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            log::error!("[SEARCH] Failed to read response body. URL: {}\nError: {}", url, e);
            SearchError::Transport(e)
        })?;

        if !status.is_success() {
            // Try to parse the structured error first
            if let Ok(payload) = serde_json::from_str::<ErrorPayload>(&text) {
                log::error!(
                    "[SEARCH] API error. Status: {}. Message: {:?}",
                    status,
                    payload.error
                );
                return Err(SearchError::Api {
                    status: status.as_u16(),
                    message: payload.error,
                });
            }
            log::error!(
                "[SEARCH] API returned non-success status: {}. Unparseable Body: {}",
                status,
                text
            );
            return Err(SearchError::RawApi {
                status: status.as_u16(),
                body: text,
            });
        }

        SearchResponse::from_json(&text).map_err(|e| {
            log::error!(
                "[SEARCH] Failed to decode SearchResponse. URL: {}\nError: {}. Body: {}",
                url,
                e,
                text
            );
            SearchError::Decode(e)
        })
    }
}
