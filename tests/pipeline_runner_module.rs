use reqpilot::audit::{AuditEntry, AuditError, AuditRecord, AuditSink, SqliteAuditLog};
use reqpilot::pipeline::{AuditWrite, PipelineError, Session, Stage, StageRunner, StageStatus};
use reqpilot::provider::{CompletionClient, CompletionError, REASONING_TRACE_MODEL};
use reqpilot::runtime::StatePaths;
use reqpilot::templates::STAGE_MARKER_PREFIX;
use std::cell::{Cell, RefCell};
use std::fs;
use tempfile::tempdir;

const VALID_KEY: &str = "gsk_abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUV";

fn stage_marker(prompt: &str) -> String {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix(STAGE_MARKER_PREFIX))
        .unwrap_or("none")
        .to_string()
}

#[derive(Default)]
struct EchoStageClient {
    prompts: RefCell<Vec<String>>,
}

impl CompletionClient for EchoStageClient {
    fn complete(
        &self,
        prompt: &str,
        _credential: &str,
        _model_id: &str,
    ) -> Result<String, CompletionError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(format!("output of {}", stage_marker(prompt)))
    }
}

/// Fails the first `failures` calls, then echoes like `EchoStageClient`.
struct FlakyClient {
    failures: Cell<usize>,
}

impl CompletionClient for FlakyClient {
    fn complete(
        &self,
        prompt: &str,
        _credential: &str,
        _model_id: &str,
    ) -> Result<String, CompletionError> {
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(CompletionError::Transport {
                endpoint: "http://127.0.0.1:9".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(format!("output of {}", stage_marker(prompt)))
    }
}

struct FixedClient(&'static str);

impl CompletionClient for FixedClient {
    fn complete(
        &self,
        _prompt: &str,
        _credential: &str,
        _model_id: &str,
    ) -> Result<String, CompletionError> {
        Ok(self.0.to_string())
    }
}

struct FailingSink;

impl AuditSink for FailingSink {
    fn append(&mut self, _entry: &AuditEntry) -> Result<AuditRecord, AuditError> {
        let source = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        Err(AuditError::Encode { source })
    }
}

fn ready_session(problem: &str) -> Session {
    let mut session = Session::new("sess-test");
    session
        .enter_credential(Some(VALID_KEY))
        .expect("valid credential");
    session.set_problem_statement(problem);
    session
}

#[test]
fn full_pipeline_stores_seven_outputs_and_seven_stage_records() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let mut runner = StageRunner::new(EchoStageClient::default(), audit, "llama3-70b-8192");
    let mut session = Session::new("sess-e2e");

    runner
        .enter_credential(&mut session, Some(VALID_KEY))
        .expect("credential accepted");
    session.set_problem_statement("Create a system to build LLM");

    let outcomes = runner.run_all(&mut session).expect("pipeline runs");
    assert_eq!(outcomes.len(), 7);
    for stage in Stage::ALL {
        assert_eq!(
            session.output(stage),
            Some(format!("output of {}", stage.as_str()).as_str())
        );
        assert_eq!(session.stage_status(stage), StageStatus::Complete);
    }

    let records = runner.audit().list(None).expect("list audit");
    let stage_actions = records
        .iter()
        .filter(|record| record.action != "credential")
        .map(|record| record.action.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        stage_actions,
        Stage::ALL.iter().map(|stage| stage.as_str()).collect::<Vec<_>>()
    );
    assert_eq!(records.len(), 8);
    assert_eq!(records[0].action, "credential");
    assert!(records.iter().all(|record| record.user_id == "sess-e2e"));
    assert!(records
        .iter()
        .all(|record| !record.details.contains(VALID_KEY)));
}

#[test]
fn each_stage_prompt_carries_its_upstream_output() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let mut runner = StageRunner::new(EchoStageClient::default(), audit, "llama3-70b-8192");
    let mut session = ready_session("Create a system to build LLM");

    runner.run_all(&mut session).expect("pipeline runs");

    let first = runner
        .run_stage(&mut session, Stage::Prioritize)
        .expect("rerun prioritize");
    assert_eq!(first.output, "output of prioritize");

    let record = runner
        .audit()
        .list(Some(1))
        .expect("list")
        .pop()
        .expect("latest record");
    assert_eq!(record.action, "prioritize");
    let details: serde_json::Value = serde_json::from_str(&record.details).expect("details json");
    assert_eq!(details["input"], "output of invest_validation");
    assert_eq!(details["output"], "output of prioritize");
}

#[test]
fn rerunning_upstream_stage_does_not_touch_downstream_output() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let mut session = ready_session("Create a system to build LLM");

    let mut first = StageRunner::new(FixedClient("X"), audit, "llama3-70b-8192");
    first
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect("stakeholders X");
    first
        .run_stage(&mut session, Stage::GenerateUserStories)
        .expect("stories from X");
    assert_eq!(session.output(Stage::GenerateUserStories), Some("X"));

    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("reopen audit");
    let mut second = StageRunner::new(FixedClient("Y"), audit, "llama3-70b-8192");
    second
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect("stakeholders Y");

    assert_eq!(session.output(Stage::IdentifyStakeholders), Some("Y"));
    assert_eq!(session.output(Stage::GenerateUserStories), Some("X"));
    assert_eq!(
        session.stage_status(Stage::GenerateUserStories),
        StageStatus::Complete
    );
}

#[test]
fn failed_completion_leaves_stage_retryable() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let client = FlakyClient {
        failures: Cell::new(1),
    };
    let mut runner = StageRunner::new(client, audit, "llama3-70b-8192");
    let mut session = ready_session("Create a system to build LLM");

    let err = runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect_err("first call fails");
    assert!(matches!(
        err,
        PipelineError::Completion {
            stage: Stage::IdentifyStakeholders,
            ..
        }
    ));
    assert_eq!(
        session.stage_status(Stage::IdentifyStakeholders),
        StageStatus::Available
    );
    assert!(!session.is_in_flight(Stage::IdentifyStakeholders));
    assert!(runner.audit().list(None).expect("list").is_empty());

    runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect("retry succeeds");
    assert_eq!(
        session.stage_status(Stage::IdentifyStakeholders),
        StageStatus::Complete
    );
}

#[test]
fn audit_failure_does_not_fail_the_stage() {
    let mut runner = StageRunner::new(EchoStageClient::default(), FailingSink, "llama3-70b-8192");
    let mut session = ready_session("Create a system to build LLM");

    let outcome = runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect("stage still succeeds");
    assert!(matches!(outcome.audit, AuditWrite::Failed { .. }));
    assert_eq!(
        session.output(Stage::IdentifyStakeholders),
        Some("output of identify_stakeholders")
    );
}

#[test]
fn stage_without_credential_is_rejected_before_any_call() {
    let client = EchoStageClient::default();
    let mut runner = StageRunner::new(&client, FailingSink, "llama3-70b-8192");
    let mut session = Session::new("sess-nokey");
    session.set_problem_statement("Create a system to build LLM");

    let err = runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect_err("no credential");
    assert!(matches!(err, PipelineError::Credential(_)));
    assert!(client.prompts.borrow().is_empty());
    assert_eq!(session.model(), None);
}

#[test]
fn blank_problem_statement_is_missing_input() {
    let mut runner = StageRunner::new(EchoStageClient::default(), FailingSink, "llama3-70b-8192");
    let mut session = ready_session("   ");

    let err = runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect_err("blank problem");
    assert!(matches!(err, PipelineError::MissingInput { .. }));
}

#[test]
fn reasoning_trace_is_stripped_for_trace_model_only() {
    let mut session = ready_session("Create a system to build LLM");
    session
        .select_model(REASONING_TRACE_MODEL)
        .expect("select model");
    let mut runner = StageRunner::new(
        FixedClient("<think>\nplanning\n</think>\n\nPrimary stakeholders"),
        FailingSink,
        "llama3-70b-8192",
    );

    let outcome = runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect("stage runs");
    assert_eq!(outcome.model, REASONING_TRACE_MODEL);
    assert_eq!(outcome.output, "Primary stakeholders");
}

#[test]
fn output_that_is_only_a_trace_counts_as_empty() {
    let mut session = ready_session("Create a system to build LLM");
    session
        .select_model(REASONING_TRACE_MODEL)
        .expect("select model");
    let mut runner = StageRunner::new(
        FixedClient("<think>nothing else</think>\n\n"),
        FailingSink,
        "llama3-70b-8192",
    );

    let err = runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect_err("empty after strip");
    assert!(matches!(
        err,
        PipelineError::Completion {
            source: CompletionError::EmptyContent,
            ..
        }
    ));
    assert_eq!(
        session.stage_status(Stage::IdentifyStakeholders),
        StageStatus::Available
    );
}

#[test]
fn default_model_is_locked_in_on_first_stage() {
    let mut runner = StageRunner::new(EchoStageClient::default(), FailingSink, "gemma2-9b-it");
    let mut session = ready_session("Create a system to build LLM");

    let outcome = runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect("stage runs");
    assert_eq!(outcome.model, "gemma2-9b-it");
    assert!(session.is_model_locked());
    assert!(session.select_model("llama3-70b-8192").is_err());
}

#[test]
fn runtime_log_records_stage_events_without_the_key() {
    let dir = tempdir().expect("tempdir");
    let paths = StatePaths::new(dir.path().join(".reqpilot"));
    let mut runner = StageRunner::new(EchoStageClient::default(), FailingSink, "llama3-70b-8192")
        .with_runtime_log(paths.clone());
    let mut session = Session::new("sess-log");

    runner
        .enter_credential(&mut session, Some(VALID_KEY))
        .expect("credential");
    session.set_problem_statement("Create a system to build LLM");
    runner
        .run_stage(&mut session, Stage::IdentifyStakeholders)
        .expect("stage runs");

    let log = fs::read_to_string(paths.runtime_log_path()).expect("read runtime log");
    assert!(log.contains("\"event\":\"credential.accepted\""));
    assert!(log.contains("\"event\":\"stage.started\""));
    assert!(log.contains("\"event\":\"stage.completed\""));
    assert!(log.contains("\"event\":\"audit.write_failed\""));
    assert!(log.contains("\"stage\":\"identify_stakeholders\""));
    assert!(!log.contains(VALID_KEY));
}

#[test]
fn blank_key_entry_is_missing_and_not_audited() {
    let dir = tempdir().expect("tempdir");
    let audit = SqliteAuditLog::open(&dir.path().join("audit.sqlite3")).expect("open audit");
    let mut runner = StageRunner::new(EchoStageClient::default(), audit, "llama3-70b-8192");
    let mut session = Session::new("sess-blank");

    let err = runner
        .enter_credential(&mut session, Some("   "))
        .expect_err("blank key");
    assert_eq!(err, reqpilot::credential::CredentialError::Missing);
    assert_eq!(
        session.credential_status(),
        reqpilot::credential::CredentialStatus::NoCredential
    );
    assert!(runner.audit().list(None).expect("list").is_empty());
}
