use crate::{PreviewResult, RunToken};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewViewModel {
    /// Token of the most recently started run.
    pub latest_token: Option<RunToken>,
    /// Token of the run whose result is currently published.
    pub published_token: Option<RunToken>,
    pub result: Option<PreviewResult>,
    /// The newest started run has not published yet.
    pub run_outstanding: bool,
}
