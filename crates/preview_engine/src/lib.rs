//! Preview engine: transform chain execution, debouncing and result delivery.
mod config;
mod debounce;
mod engine;
mod error;
mod handle;
mod stage;
mod stages;
mod surface;

pub use config::EngineConfig;
pub use debounce::{Debouncer, DEFAULT_INTERVAL};
pub use engine::{Observer, PreviewEngine};
pub use error::EngineError;
pub use handle::{EngineEvent, EngineHandle};
pub use stage::{FnStage, StageFault, TransformChain, TransformStage};
pub use stages::{
    chain_from_names, default_stage_names, JsonCompact, JsonPretty, RonToJson,
    TrimTrailingWhitespace, BUILTIN_STAGES,
};
pub use surface::{forward_edit, ErrorSink, MemorySurface, OutputSink, SurfaceBinding};
