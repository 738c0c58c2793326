use crate::pipeline::Stage;

pub mod stage_prompts;

pub use stage_prompts::{
    render_elicitation_techniques, render_epic_conflict_analysis, render_generate_user_stories,
    render_identify_stakeholders, render_invest_validation, render_justify_elicitation,
    render_prioritize, STAGE_MARKER_PREFIX,
};

/// Single-pass `{{name}}` substitution. Substituted text is never scanned
/// again, and placeholders without a value (or without a closing `}}`) are
/// kept literally, so rendering cannot fail.
pub fn render_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut cursor = template;

    while let Some(start) = cursor.find("{{") {
        rendered.push_str(&cursor[..start]);
        let after_open = &cursor[start + 2..];
        let Some(close_offset) = after_open.find("}}") else {
            rendered.push_str(&cursor[start..]);
            return rendered;
        };
        let token = after_open[..close_offset].trim();
        match values.iter().find(|(name, _)| *name == token) {
            Some((_, value)) => rendered.push_str(value),
            None => rendered.push_str(&cursor[start..start + 2 + close_offset + 2]),
        }
        cursor = &after_open[close_offset + 2..];
    }

    rendered.push_str(cursor);
    rendered
}

/// Wraps an instructional template in the AI/HUMAN transcript the stage
/// prompts are sent as.
pub(crate) fn frame_transcript(instructions: &str, request: &str) -> String {
    format!(
        "AI:\n{}\n\nHUMAN:\n{}\n\nAI:\n",
        instructions.trim(),
        request.trim()
    )
}

pub fn render_stage_prompt(stage: Stage, input: &str) -> String {
    match stage {
        Stage::IdentifyStakeholders => render_identify_stakeholders(input),
        Stage::ElicitationTechniques => render_elicitation_techniques(input),
        Stage::JustifyElicitation => render_justify_elicitation(input),
        Stage::GenerateUserStories => render_generate_user_stories(input),
        Stage::InvestValidation => render_invest_validation(input),
        Stage::Prioritize => render_prioritize(input),
        Stage::EpicConflictAnalysis => render_epic_conflict_analysis(input),
    }
}
