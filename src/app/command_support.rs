use crate::audit::SqliteAuditLog;
use crate::config::{load_settings, ConfigError, Settings};
use crate::pipeline::{AuditWrite, Session, Stage, StageOutcome, StageRunner};
use crate::provider::GroqClient;
use crate::runtime::{bootstrap_state_root, default_state_root_path, StatePaths};

pub type LiveRunner = StageRunner<GroqClient, SqliteAuditLog>;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn ensure_runtime_root() -> Result<StatePaths, String> {
    let root = default_state_root_path().map_err(|e| e.to_string())?;
    let paths = StatePaths::new(root);
    bootstrap_state_root(&paths).map_err(|e| e.to_string())?;
    Ok(paths)
}

pub fn load_settings_or_err(paths: &StatePaths) -> Result<Settings, String> {
    load_settings(paths).map_err(map_config_err)
}

pub fn open_audit_log(paths: &StatePaths, settings: &Settings) -> Result<SqliteAuditLog, String> {
    SqliteAuditLog::open(&settings.resolve_audit_db_path(paths)).map_err(|e| e.to_string())
}

/// The audit log is opened up front; a database that cannot even be opened is
/// a setup problem, unlike a failed append during a stage.
pub fn build_live_runner(paths: &StatePaths, settings: &Settings) -> Result<LiveRunner, String> {
    let client = GroqClient::new(&settings.api_base, settings.request_timeout());
    let audit = open_audit_log(paths, settings)?;
    Ok(StageRunner::new(client, audit, settings.default_model.clone())
        .with_runtime_log(paths.clone()))
}

pub fn new_session(settings: &Settings) -> Result<Session, String> {
    let mut session = Session::start()?;
    if let Some(student_id) = &settings.student_id {
        session.set_student_id(student_id);
    }
    Ok(session)
}

pub fn stage_heading(stage: Stage) -> String {
    format!("===== {} =====", stage.title())
}

pub fn render_outcome(outcome: &StageOutcome) -> String {
    let mut rendered = format!(
        "{}\n\n{}",
        stage_heading(outcome.stage),
        outcome.output.trim_end()
    );
    if let AuditWrite::Failed { reason } = &outcome.audit {
        rendered.push_str(&format!("\n\nnote: audit record not written: {reason}"));
    }
    rendered
}

pub fn render_stage_status(session: &Session) -> String {
    let mut lines = vec![
        format!("session={}", session.session_id()),
        format!("credential={}", session.credential_status()),
        format!(
            "model={}{}",
            session.model().unwrap_or("none"),
            if session.is_model_locked() { " (locked)" } else { "" }
        ),
        format!("student={}", session.student_id().unwrap_or("none")),
    ];
    for stage in Stage::ALL {
        let busy = if session.is_in_flight(stage) { " busy" } else { "" };
        lines.push(format!(
            "  {:24} {}{busy}",
            stage.as_str(),
            session.stage_status(stage)
        ));
    }
    lines.join("\n")
}
