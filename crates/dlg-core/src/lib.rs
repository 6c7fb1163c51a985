pub mod classify;
pub mod config;
pub mod emitter;
pub mod error;
pub mod id;
pub mod layout;
pub mod model;
pub mod parser;

pub use classify::{ChangeSize, classify};
pub use config::EditorConfig;
pub use emitter::emit_dialogue;
pub use error::{ConfigError, ConfigLoadError, EmitError, ParseError, SlotError};
pub use id::SceneId;
pub use layout::{DEFAULT_SCALE, group_around_scene};
pub use model::*;
pub use parser::parse_dialogue;
