pub mod config;
pub mod engine;
pub mod framework;
pub mod glyph;
pub mod input;
pub mod lattice;
pub mod motion;
pub mod prelude;
pub mod render;
pub mod runtime;
pub mod theme;

pub use config::{ClickMode, ConfigError, EngineConfig};
pub use engine::{Engine, EngineEvent};
pub use runtime::app::{RunOptions, run};
pub use theme::Theme;
