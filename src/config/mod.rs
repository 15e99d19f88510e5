// Static configuration: well-known service values and user overrides.

mod loader;
mod types;

pub use loader::{config_path, home_dir, load};
pub use types::{
    Config, DEFAULT_PASSWORD, DEFAULT_UI_PORT, DEFAULT_USER, MIN_POLL_INTERVAL_MS, UI_SERVICE,
    UiSettings,
};
