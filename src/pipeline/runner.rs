use crate::audit::{AuditEntry, AuditSink};
use crate::credential::CredentialError;
use crate::pipeline::{PipelineError, Session, Stage};
use crate::provider::{sanitize, CompletionClient, CompletionError};
use crate::runtime::{append_runtime_event, append_runtime_log, LogLevel, StatePaths};
use crate::templates::render_stage_prompt;
use serde_json::Value;

/// Whether the audit append after a step went through. A failed append never
/// fails the step itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditWrite {
    Recorded { id: i64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub model: String,
    pub output: String,
    pub audit: AuditWrite,
}

/// Drives stage invocations for one session against a completion client and
/// an audit sink.
pub struct StageRunner<C, A> {
    client: C,
    audit: A,
    default_model: String,
    log_paths: Option<StatePaths>,
}

impl<C: CompletionClient, A: AuditSink> StageRunner<C, A> {
    pub fn new(client: C, audit: A, default_model: impl Into<String>) -> Self {
        Self {
            client,
            audit,
            default_model: default_model.into(),
            log_paths: None,
        }
    }

    pub fn with_runtime_log(mut self, paths: StatePaths) -> Self {
        self.log_paths = Some(paths);
        self
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    fn log(&self, level: LogLevel, event: &str, message: &str) {
        if let Some(paths) = &self.log_paths {
            append_runtime_log(paths, level, event, message);
        }
    }

    fn log_stage(
        &self,
        level: LogLevel,
        event: &str,
        session: &Session,
        stage: Stage,
        message: &str,
    ) {
        if let Some(paths) = &self.log_paths {
            append_runtime_event(
                paths,
                level,
                event,
                message,
                &[
                    ("sessionId", Value::String(session.session_id().to_string())),
                    ("stage", Value::String(stage.as_str().to_string())),
                ],
            );
        }
    }

    fn record(&mut self, entry: &AuditEntry) -> AuditWrite {
        match self.audit.append(entry) {
            Ok(record) => AuditWrite::Recorded { id: record.id },
            Err(err) => {
                let reason = err.to_string();
                self.log(
                    LogLevel::Error,
                    "audit.write_failed",
                    &format!("action={} error={reason}", entry.action),
                );
                AuditWrite::Failed { reason }
            }
        }
    }

    /// Runs the credential gate and audits the entry. A missing or blank key is
    /// not an entry and is not audited.
    pub fn enter_credential(
        &mut self,
        session: &mut Session,
        input: Option<&str>,
    ) -> Result<(), CredentialError> {
        let outcome = session.enter_credential(input);
        match &outcome {
            Ok(()) => self.log(
                LogLevel::Info,
                "credential.accepted",
                &format!("session={}", session.session_id()),
            ),
            Err(err) => self.log(
                LogLevel::Warn,
                "credential.rejected",
                &format!("session={} reason={err}", session.session_id()),
            ),
        }
        if let Some(raw) = input.filter(|raw| !raw.trim().is_empty()) {
            let entry =
                AuditEntry::credential_entered(session, raw.len(), outcome.as_ref().copied());
            self.record(&entry);
        }
        outcome
    }

    pub fn select_model(&self, session: &mut Session, model: &str) -> Result<(), PipelineError> {
        match session.select_model(model) {
            Ok(()) => {
                self.log(
                    LogLevel::Info,
                    "model.selected",
                    &format!("session={} model={}", session.session_id(), model.trim()),
                );
                Ok(())
            }
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "model.locked",
                    &format!("session={} {err}", session.session_id()),
                );
                Err(err)
            }
        }
    }

    /// Invokes one stage. On any failure the session keeps its previous
    /// outputs and the stage stays retryable.
    pub fn run_stage(
        &mut self,
        session: &mut Session,
        stage: Stage,
    ) -> Result<StageOutcome, PipelineError> {
        session.ensure_invocable(stage)?;
        let input = session.stage_input(stage)?;
        let model = session.ensure_model(&self.default_model)?;
        let credential = session.credential()?.expose().to_string();
        let ticket = session.begin_stage(stage)?;

        self.log_stage(
            LogLevel::Info,
            "stage.started",
            session,
            stage,
            &format!("model={model}"),
        );
        let prompt = render_stage_prompt(stage, &input);
        let completed = self
            .client
            .complete(&prompt, &credential, &model)
            .map(|raw| sanitize(&raw, &model))
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(CompletionError::EmptyContent)
                } else {
                    Ok(text)
                }
            });

        let output = match completed {
            Ok(output) => output,
            Err(source) => {
                session.abandon_stage(ticket);
                self.log_stage(
                    LogLevel::Error,
                    "stage.failed",
                    session,
                    stage,
                    &source.to_string(),
                );
                return Err(PipelineError::Completion { stage, source });
            }
        };

        session.finish_stage(ticket, output.clone());
        self.log_stage(
            LogLevel::Info,
            "stage.completed",
            session,
            stage,
            &format!("model={model} output_bytes={}", output.len()),
        );
        let entry = AuditEntry::stage_completed(session, stage, &input, &output);
        let audit = self.record(&entry);

        Ok(StageOutcome {
            stage,
            model,
            output,
            audit,
        })
    }

    /// Runs every stage in declared dependency order, stopping at the first
    /// failure.
    pub fn run_all(&mut self, session: &mut Session) -> Result<Vec<StageOutcome>, PipelineError> {
        let mut outcomes = Vec::with_capacity(Stage::ALL.len());
        for stage in Stage::ALL {
            outcomes.push(self.run_stage(session, stage)?);
        }
        Ok(outcomes)
    }
}
