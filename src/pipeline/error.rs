use crate::credential::CredentialError;
use crate::pipeline::Stage;
use crate::provider::CompletionError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    Credential(#[from] CredentialError),
    #[error("stage `{stage}` is locked until `{requires}` completes")]
    StageLocked { stage: Stage, requires: Stage },
    #[error("stage `{stage}` is already running")]
    StageBusy { stage: Stage },
    #[error("stage `{stage}` has no input: {reason}")]
    MissingInput { stage: Stage, reason: String },
    #[error(
        "model `{current}` is locked until `epic_conflict_analysis` completes; cannot switch to `{requested}`"
    )]
    ModelLocked { current: String, requested: String },
    #[error("model id must be non-empty")]
    EmptyModel,
    #[error("stage `{stage}` failed: {source}")]
    Completion {
        stage: Stage,
        #[source]
        source: CompletionError,
    },
}
