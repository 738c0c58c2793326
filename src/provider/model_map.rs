pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const REASONING_TRACE_MODEL: &str = "deepseek-r1-distill-llama-70b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownModel {
    pub id: &'static str,
    pub description: &'static str,
    pub emits_reasoning_trace: bool,
}

const KNOWN_MODELS: [KnownModel; 3] = [
    KnownModel {
        id: DEFAULT_MODEL,
        description: "Llama 3 70B, 8k context",
        emits_reasoning_trace: false,
    },
    KnownModel {
        id: REASONING_TRACE_MODEL,
        description: "DeepSeek R1 distilled Llama 70B, emits a <think> trace",
        emits_reasoning_trace: true,
    },
    KnownModel {
        id: "gemma2-9b-it",
        description: "Gemma 2 9B instruction tuned",
        emits_reasoning_trace: false,
    },
];

pub fn known_models() -> &'static [KnownModel] {
    &KNOWN_MODELS
}

/// Unknown ids are still valid selections; they are passed to the endpoint
/// as given.
pub fn is_known_model(model_id: &str) -> bool {
    KNOWN_MODELS.iter().any(|model| model.id == model_id.trim())
}

pub fn emits_reasoning_trace(model_id: &str) -> bool {
    model_id.trim() == REASONING_TRACE_MODEL
}
