// docker-compose orchestration: working directory resolution and invocation.

pub mod engine;
pub mod types;
pub mod workdir;

pub use engine::Compose;
pub use types::{CancelToken, ComposeError, Orchestrator};
pub use workdir::{ACTIVE_LINK, resolve as resolve_workdir};
