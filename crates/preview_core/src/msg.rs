use crate::{PreviewResult, RunToken, SourceText};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The editable surface delivered a new full-text snapshot.
    SourceChanged(SourceText),
    /// The debouncer fired (or the host asked for an immediate run).
    RunRequested,
    /// A transform run finished with `result`.
    RunFinished {
        token: RunToken,
        result: PreviewResult,
    },
}
