pub mod sdk;

pub use sdk::config::{InteractionMode, SearchConfig};
pub use sdk::map::{LatLng, MapCanvas, MemoryCanvas, RendererConfig, ResultRenderer, Viewport};
pub use sdk::response::{Feature, Geometry, SearchResponse};
pub use sdk::search::{serialize, Page, PageLocation, QueryParameters, SearchClient, SearchError, SearchOrchestrator, SearchPhase};
