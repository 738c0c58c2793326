use reqpilot::app::command_handlers::session::{
    handle_session_command, parse_session_command, run_interactive, SessionCommand,
    SESSION_PROMPT,
};
use reqpilot::audit::SqliteAuditLog;
use reqpilot::pipeline::{Session, Stage, StageRunner};
use reqpilot::provider::{CompletionClient, CompletionError};
use std::io::Cursor;
use tempfile::tempdir;

const VALID_KEY: &str = "gsk_abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUV";

struct CannedClient;

impl CompletionClient for CannedClient {
    fn complete(
        &self,
        _prompt: &str,
        _credential: &str,
        model_id: &str,
    ) -> Result<String, CompletionError> {
        Ok(format!("answer from {model_id}"))
    }
}

#[test]
fn session_commands_parse_with_arguments() {
    assert_eq!(
        parse_session_command("key gsk_abc").expect("key"),
        SessionCommand::Key("gsk_abc".to_string())
    );
    assert_eq!(
        parse_session_command("problem  Build a library catalogue ").expect("problem"),
        SessionCommand::Problem("Build a library catalogue".to_string())
    );
    assert_eq!(
        parse_session_command("RUN invest-validation").expect("run"),
        SessionCommand::Run(Stage::InvestValidation)
    );
    assert_eq!(
        parse_session_command("show prioritize").expect("show"),
        SessionCommand::Show(Stage::Prioritize)
    );
    assert_eq!(parse_session_command("   ").expect("empty"), SessionCommand::Empty);
    assert_eq!(parse_session_command("quit").expect("quit"), SessionCommand::Exit);
}

#[test]
fn malformed_session_commands_are_errors() {
    assert!(parse_session_command("model").is_err());
    assert!(parse_session_command("run").is_err());
    assert!(parse_session_command("deploy now").is_err());
}

#[test]
fn show_before_run_reports_missing_output() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let mut runner = StageRunner::new(CannedClient, audit, "llama3-70b-8192");
    let mut session = Session::new("sess-show");
    let err = handle_session_command(
        &mut runner,
        &mut session,
        SessionCommand::Show(Stage::IdentifyStakeholders),
    )
    .expect_err("no output");
    assert!(err.contains("identify_stakeholders"));
}

#[test]
fn interactive_session_walks_stages_and_survives_errors() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let mut runner = StageRunner::new(CannedClient, audit, "llama3-70b-8192");
    let mut session = Session::new("sess-repl");

    let script = format!(
        "run identify_stakeholders\n\
         key not-a-key\n\
         key {VALID_KEY}\n\
         student s-9\n\
         model gemma2-9b-it\n\
         problem Create a system to build LLM\n\
         run generate_user_stories\n\
         run identify_stakeholders\n\
         model llama3-70b-8192\n\
         show identify_stakeholders\n\
         status\n\
         exit\n\
         run generate_user_stories\n"
    );
    let mut output = Vec::new();
    run_interactive(&mut runner, &mut session, Cursor::new(script), &mut output)
        .expect("session loop");
    let output = String::from_utf8(output).expect("utf8");

    assert!(output.starts_with("session sess-repl\n"));
    assert!(output.contains("enter an API key with `key <secret>`"));
    assert!(output.contains(SESSION_PROMPT));
    assert!(output.contains("error: invalid API key format"));
    assert!(output.contains("credential accepted\nnext: identify_stakeholders"));
    assert!(output.contains("student=s-9"));
    assert!(output.contains("model=gemma2-9b-it"));
    assert!(output.contains("[busy] running identify_stakeholders..."));
    assert!(output.contains("===== Stakeholders & End Users ====="));
    assert!(output.contains("answer from gemma2-9b-it"));
    assert!(output.contains("next: elicitation_techniques, generate_user_stories"));
    assert!(output.contains("model=gemma2-9b-it (locked)"));

    assert_eq!(
        session.output(Stage::IdentifyStakeholders),
        Some("answer from gemma2-9b-it")
    );
    assert_eq!(session.output(Stage::GenerateUserStories), None);
    assert_eq!(session.student_id(), Some("s-9"));

    let records = runner.audit().list(None).expect("list");
    let actions = records
        .iter()
        .map(|record| record.action.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        actions,
        vec!["credential", "credential", "identify_stakeholders"]
    );
    assert_eq!(records[2].student_id, "s-9");
    assert_eq!(records[2].model_name, "gemma2-9b-it");
}

#[test]
fn session_banner_reports_a_rejected_key_instead_of_prompting() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let mut runner = StageRunner::new(CannedClient, audit, "llama3-70b-8192");
    let mut session = Session::new("sess-envkey");
    runner
        .enter_credential(&mut session, Some("gsk_tooshort"))
        .expect_err("malformed key");

    let mut output = Vec::new();
    run_interactive(&mut runner, &mut session, Cursor::new(""), &mut output)
        .expect("session loop");
    let output = String::from_utf8(output).expect("utf8");

    assert!(output.contains("error: invalid API key format"));
    assert!(!output.contains("enter an API key with `key <secret>`"));
    assert!(output.contains("next: none"));
}

#[test]
fn session_banner_prompts_when_no_key_was_given() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let mut runner = StageRunner::new(CannedClient, audit, "llama3-70b-8192");
    let mut session = Session::new("sess-nokey");

    let mut output = Vec::new();
    run_interactive(&mut runner, &mut session, Cursor::new(""), &mut output)
        .expect("session loop");
    let output = String::from_utf8(output).expect("utf8");

    assert!(output.contains("enter an API key with `key <secret>`"));
    assert!(!output.contains("error:"));
}
