pub mod client;
pub mod error;
pub mod orchestrator;
pub mod page;
pub mod query;

pub use client::SearchClient;
pub use error::SearchError;
pub use orchestrator::{SearchOrchestrator, SearchOutcome, SearchPhase};
pub use page::{ConsolePage, Page, PageLocation};
pub use query::{serialize, QueryParameters};
