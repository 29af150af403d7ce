pub mod cache;
pub mod icon;
pub mod path_data;

pub use cache::{GlyphAsset, GlyphCache, GlyphSet, GlyphStyle, RASTER_SCALE};
pub use icon::{Icon, IconCatalog, IconElement, VIEW_BOX};
pub use path_data::{PathDataError, parse_path_data};
