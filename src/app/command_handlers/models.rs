use crate::app::command_support::{ensure_runtime_root, load_settings_or_err};
use crate::pipeline::Stage;
use crate::provider::known_models;

pub fn render_models(default_model: &str) -> String {
    let mut lines = vec!["Models:".to_string()];
    for model in known_models() {
        let mut tags = Vec::new();
        if model.id == default_model {
            tags.push("default");
        }
        if model.emits_reasoning_trace {
            tags.push("reasoning trace stripped");
        }
        let suffix = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        lines.push(format!("  {:32} {}{suffix}", model.id, model.description));
    }
    lines.push("Other model ids are passed to the endpoint unchanged.".to_string());
    lines.join("\n")
}

pub fn cmd_models() -> Result<String, String> {
    let paths = ensure_runtime_root()?;
    let settings = load_settings_or_err(&paths)?;
    Ok(render_models(&settings.default_model))
}

pub fn cmd_stages() -> Result<String, String> {
    let mut lines = vec!["Stages:".to_string()];
    for stage in Stage::ALL {
        let requires = stage
            .prerequisite()
            .map(|required| format!("after {required}"))
            .unwrap_or_else(|| "needs a problem statement".to_string());
        lines.push(format!("  {:24} {:30} {requires}", stage.as_str(), stage.title()));
    }
    Ok(lines.join("\n"))
}
