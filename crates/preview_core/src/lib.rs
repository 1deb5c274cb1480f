//! Preview core: pure run-bookkeeping state machine and surface projection.
mod effect;
mod msg;
mod result;
mod source;
mod state;
mod surface;
mod update;
mod view_model;

pub use effect::{DiscardReason, Effect};
pub use msg::Msg;
pub use result::PreviewResult;
pub use source::{RunToken, SourceText};
pub use state::PreviewState;
pub use surface::{OutputRetention, SurfaceCommand, SurfaceProjector};
pub use update::update;
pub use view_model::PreviewViewModel;
