pub mod info_window;
pub mod jitter;
pub mod pipeline;
pub mod sdk;
pub mod view;

pub use info_window::render_info_window;
pub use jitter::Jitter;
pub use pipeline::{MapSnapshot, Marker, MarkerId, MarkerPipeline};
pub use sdk::{MapError, MapSettings, MapsSdk, SdkLoader, DEFAULT_MAX_ZOOM};
pub use view::{Bounds, MapView, Viewport};
