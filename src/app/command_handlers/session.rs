use crate::app::command_support::{
    build_live_runner, ensure_runtime_root, load_settings_or_err, new_session, render_outcome,
    render_stage_status,
};
use crate::audit::AuditSink;
use crate::config::credential_from_env;
use crate::credential::{CredentialError, CredentialStatus};
use crate::pipeline::{Session, Stage, StageRunner};
use crate::provider::CompletionClient;
use std::io::{self, BufRead, Write};

pub const SESSION_PROMPT: &str = "reqpilot> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Key(String),
    Student(String),
    Model(String),
    Problem(String),
    Run(Stage),
    Show(Stage),
    Status,
    Help,
    Exit,
    Empty,
}

pub fn parse_session_command(line: &str) -> Result<SessionCommand, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(SessionCommand::Empty);
    }
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "key" => Ok(SessionCommand::Key(rest.to_string())),
        "student" => Ok(SessionCommand::Student(rest.to_string())),
        "model" => {
            if rest.is_empty() {
                return Err("model requires an id".to_string());
            }
            Ok(SessionCommand::Model(rest.to_string()))
        }
        "problem" => Ok(SessionCommand::Problem(rest.to_string())),
        "run" => Stage::parse(rest).map(SessionCommand::Run),
        "show" => Stage::parse(rest).map(SessionCommand::Show),
        "status" => Ok(SessionCommand::Status),
        "help" => Ok(SessionCommand::Help),
        "exit" | "quit" | "/exit" => Ok(SessionCommand::Exit),
        other => Err(format!("unknown session command `{other}`; try `help`")),
    }
}

pub fn session_help_lines() -> Vec<String> {
    vec![
        "Session commands:".to_string(),
        "  key <secret>        Enter the API key".to_string(),
        "  student <id>        Set the student id recorded in the audit log".to_string(),
        "  model <id>          Choose the model (locked until epic_conflict_analysis completes)"
            .to_string(),
        "  problem <text>      Set the problem statement".to_string(),
        "  run <stage>         Run a stage".to_string(),
        "  show <stage>        Print a stage's stored output".to_string(),
        "  status              Show credential, model and stage states".to_string(),
        "  exit                Leave the session".to_string(),
    ]
}

fn next_line(session: &Session) -> String {
    let next = session.next_actions();
    if next.is_empty() {
        return "next: none".to_string();
    }
    format!(
        "next: {}",
        next.iter()
            .map(|stage| stage.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    )
}

pub fn handle_session_command<C: CompletionClient, A: AuditSink>(
    runner: &mut StageRunner<C, A>,
    session: &mut Session,
    command: SessionCommand,
) -> Result<String, String> {
    match command {
        SessionCommand::Key(secret) => {
            runner
                .enter_credential(session, Some(secret.as_str()))
                .map_err(|err| err.to_string())?;
            Ok(format!("credential accepted\n{}", next_line(session)))
        }
        SessionCommand::Student(student_id) => {
            session.set_student_id(&student_id);
            Ok(format!("student={}", session.student_id().unwrap_or("none")))
        }
        SessionCommand::Model(model) => {
            runner
                .select_model(session, &model)
                .map_err(|err| err.to_string())?;
            Ok(format!("model={}", session.model().unwrap_or("none")))
        }
        SessionCommand::Problem(text) => {
            session.set_problem_statement(&text);
            Ok("problem statement set".to_string())
        }
        SessionCommand::Run(stage) => {
            let outcome = runner
                .run_stage(session, stage)
                .map_err(|err| err.to_string())?;
            Ok(format!("{}\n\n{}", render_outcome(&outcome), next_line(session)))
        }
        SessionCommand::Show(stage) => session
            .output(stage)
            .map(str::to_string)
            .ok_or_else(|| format!("stage `{stage}` has no output yet")),
        SessionCommand::Status => Ok(format!(
            "{}\n{}",
            render_stage_status(session),
            next_line(session)
        )),
        SessionCommand::Help => Ok(session_help_lines().join("\n")),
        SessionCommand::Exit | SessionCommand::Empty => Ok(String::new()),
    }
}

/// Line-oriented session loop. Every error is printed and scoped to the
/// command that caused it; only end of input or `exit` ends the loop.
pub fn run_interactive<R, W, C, A>(
    runner: &mut StageRunner<C, A>,
    session: &mut Session,
    input: R,
    mut output: W,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    C: CompletionClient,
    A: AuditSink,
{
    writeln!(output, "session {}", session.session_id())?;
    match session.credential_status() {
        CredentialStatus::Ready => {}
        CredentialStatus::CredentialInvalid => {
            writeln!(output, "error: {}", CredentialError::InvalidFormat)?;
        }
        CredentialStatus::NoCredential => {
            writeln!(output, "enter an API key with `key <secret>`")?;
        }
    }
    writeln!(output, "{}", next_line(session))?;

    let mut lines = input.lines();
    loop {
        write!(output, "{SESSION_PROMPT}")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let command = match parse_session_command(&line?) {
            Ok(SessionCommand::Exit) => break,
            Ok(SessionCommand::Empty) => continue,
            Ok(command) => command,
            Err(err) => {
                writeln!(output, "error: {err}")?;
                continue;
            }
        };
        if let SessionCommand::Run(stage) = &command {
            writeln!(output, "[busy] running {stage}...")?;
            output.flush()?;
        }
        match handle_session_command(runner, session, command) {
            Ok(text) => writeln!(output, "{text}")?,
            Err(err) => writeln!(output, "error: {err}")?,
        }
    }
    writeln!(output)?;
    Ok(())
}

pub fn cmd_session() -> Result<String, String> {
    let paths = ensure_runtime_root()?;
    let settings = load_settings_or_err(&paths)?;
    let mut runner = build_live_runner(&paths, &settings)?;
    let mut session = new_session(&settings)?;
    if let Some(key) = credential_from_env() {
        // A rejected key is reported by the session banner.
        let _ = runner.enter_credential(&mut session, Some(key.as_str()));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_interactive(&mut runner, &mut session, stdin.lock(), stdout.lock())
        .map_err(|err| format!("session i/o failed: {err}"))?;
    Ok(format!("session {} ended", session.session_id()))
}
