use crate::{Effect, Msg, PreviewState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PreviewState, msg: Msg) -> (PreviewState, Vec<Effect>) {
    let effects = match msg {
        Msg::SourceChanged(source) => {
            state.record_source(source);
            vec![Effect::ScheduleRun]
        }
        Msg::RunRequested => match state.start_run() {
            // The snapshot is read here, when the run starts, so edits that
            // landed while the timer was pending are all folded in.
            Some((token, source)) => vec![Effect::StartRun { token, source }],
            None => Vec::new(),
        },
        Msg::RunFinished { token, result } => match state.accept(token, result) {
            Ok(result) => vec![Effect::Publish { token, result }],
            Err(reason) => vec![Effect::Discard { token, reason }],
        },
    };

    (state, effects)
}
