pub mod canvas;
pub mod geo;
pub mod memory;
pub mod renderer;

pub use canvas::{Circle, CircleStyle, LayerId, MapCanvas, MapError, Marker, Popup};
pub use geo::{LatLng, LatLngBounds, Viewport};
pub use memory::{Layer, MapSnapshot, MemoryCanvas};
pub use renderer::{RenderError, RendererConfig, ResultRenderer, ViewportState};
