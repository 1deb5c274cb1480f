use crate::view_model::PreviewViewModel;
use crate::{DiscardReason, PreviewResult, RunToken, SourceText};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewState {
    latest: Option<SourceText>,
    last_started: Option<RunToken>,
    published_token: Option<RunToken>,
    result: Option<PreviewResult>,
}

impl PreviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> PreviewViewModel {
        PreviewViewModel {
            latest_token: self.last_started,
            published_token: self.published_token,
            result: self.result.clone(),
            run_outstanding: self.run_outstanding(),
        }
    }

    pub fn latest_source(&self) -> Option<&SourceText> {
        self.latest.as_ref()
    }

    /// The most recently published result, `None` before the first run lands.
    pub fn current_result(&self) -> Option<&PreviewResult> {
        self.result.as_ref()
    }

    pub fn last_started(&self) -> Option<RunToken> {
        self.last_started
    }

    pub fn run_outstanding(&self) -> bool {
        self.last_started.is_some() && self.last_started != self.published_token
    }

    pub(crate) fn record_source(&mut self, source: SourceText) {
        self.latest = Some(source);
    }

    /// Allocates the next token against the latest snapshot.
    pub(crate) fn start_run(&mut self) -> Option<(RunToken, SourceText)> {
        let source = self.latest.clone()?;
        let token = self.last_started.map_or(RunToken::FIRST, RunToken::next);
        self.last_started = Some(token);
        Some((token, source))
    }

    pub(crate) fn accept(
        &mut self,
        token: RunToken,
        result: PreviewResult,
    ) -> Result<PreviewResult, DiscardReason> {
        let Some(current) = self.last_started else {
            return Err(DiscardReason::UnknownRun);
        };
        if token > current || self.published_token == Some(token) {
            return Err(DiscardReason::UnknownRun);
        }
        if token < current {
            return Err(DiscardReason::Stale { current });
        }
        self.published_token = Some(token);
        self.result = Some(result.clone());
        Ok(result)
    }
}
