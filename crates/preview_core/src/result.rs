/// Outcome of one full pass of the transform chain over one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewResult {
    /// Every stage succeeded; `text` is the last stage's output.
    Rendered { text: String },
    /// Stage `stage_index` faulted and later stages did not run.
    Failed {
        message: String,
        stage_index: usize,
        stage_name: String,
    },
}

impl PreviewResult {
    pub fn rendered(text: impl Into<String>) -> Self {
        Self::Rendered { text: text.into() }
    }

    pub fn failed(
        message: impl Into<String>,
        stage_index: usize,
        stage_name: impl Into<String>,
    ) -> Self {
        Self::Failed {
            message: message.into(),
            stage_index,
            stage_name: stage_name.into(),
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    pub fn rendered_text(&self) -> Option<&str> {
        match self {
            Self::Rendered { text } => Some(text),
            Self::Failed { .. } => None,
        }
    }
}
