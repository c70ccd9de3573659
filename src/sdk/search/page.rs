use super::query::QueryParameters;

/// The host page the orchestrator runs in.
pub trait Page {
    /// Leaves the current view for `target` (a path with optional query string).
    fn navigate(&self, target: &str);

    /// Shows a message to the user.
    fn alert(&self, message: &str);
}

/// Where the page currently is: its path and query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub path: String,
    pub query: QueryParameters,
    /// The raw query string was non-empty, even if every value in it was blank.
    pub has_query: bool,
}

impl PageLocation {
    /// Accepts `/results/?q=..`, `results?q=..` or a full URL.
    pub fn parse(location: &str) -> Self {
        let without_fragment = location.split('#').next().unwrap_or_default();
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));
        let path = match url::Url::parse(path) {
            Ok(url) if url.has_host() => url.path().to_string(),
            _ if path.starts_with('/') => path.to_string(),
            _ => format!("/{}", path),
        };
        let query = query.trim_start_matches('?');
        Self {
            path,
            query: QueryParameters::parse(query),
            has_query: !query.is_empty(),
        }
    }
}

/// Page used by the command line: navigation and alerts go to the log and stdout.
#[derive(Debug, Default)]
pub struct ConsolePage;

impl Page for ConsolePage {
    fn navigate(&self, target: &str) {
        log::info!("[PAGE] Navigate to {}", target);
        println!("navigate: {}", target);
    }

    fn alert(&self, message: &str) {
        log::warn!("[PAGE] Alert: {}", message);
        println!("alert: {}", message);
    }
}
