#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    Session,
    Logs,
    Models,
    Stages,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "session" => CliVerb::Session,
        "logs" => CliVerb::Logs,
        "models" => CliVerb::Models,
        "stages" => CliVerb::Stages,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  run [--model <id>] [--student <id>] <problem...>  Run every stage in order"
            .to_string(),
        "  session                              Start an interactive step-by-step session"
            .to_string(),
        "  logs [--limit <n>]                   List audit records".to_string(),
        "  models                               List known model ids".to_string(),
        "  stages                               List pipeline stages and prerequisites"
            .to_string(),
        String::new(),
        "Environment:".to_string(),
        "  GROQ_API_KEY                         API key used when none is entered".to_string(),
        "  REQPILOT_HOME                        State root (default ~/.reqpilot)".to_string(),
        "  REQPILOT_API_BASE                    Override the completion endpoint base url"
            .to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}
