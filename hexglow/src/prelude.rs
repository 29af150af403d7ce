pub use crate::config::{ClickMode, ConfigError, EngineConfig};
pub use crate::debug_throttled;
pub use crate::engine::{Engine, EngineEvent};
pub use crate::framework::logging::init_logger;
pub use crate::framework::logging::{debug, error, info, trace, warn};
pub use crate::glyph::{Icon, IconCatalog, IconElement};
pub use crate::input::{ClickOutcome, InteractiveRegions, Rect};
pub use crate::lattice::{Cell, Lattice};
pub use crate::run;
pub use crate::runtime::app::RunOptions;
pub use crate::runtime::events::{
    RuntimeCommand, RuntimeCommandReceiver, RuntimeCommandSender,
    command_channel,
};
pub use crate::theme::Theme;
pub use crate::warn_once;
