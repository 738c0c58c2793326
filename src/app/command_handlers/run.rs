use crate::app::command_support::{
    build_live_runner, ensure_runtime_root, load_settings_or_err, new_session, render_outcome,
};
use crate::audit::AuditSink;
use crate::config::credential_from_env;
use crate::pipeline::{Session, Stage, StageRunner};
use crate::provider::CompletionClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub model: Option<String>,
    pub student_id: Option<String>,
    pub problem_statement: String,
}

pub fn parse_run_args(args: &[String]) -> Result<RunOptions, String> {
    let mut options = RunOptions::default();
    let mut words = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--model" | "--student" => {
                let flag = args[i].as_str();
                let Some(value) = args.get(i + 1) else {
                    return Err(format!("{flag} requires a value"));
                };
                if flag == "--model" {
                    options.model = Some(value.clone());
                } else {
                    options.student_id = Some(value.clone());
                }
                i += 2;
            }
            "--" => {
                words.extend(args[i + 1..].iter().cloned());
                break;
            }
            _ => {
                words.push(args[i].clone());
                i += 1;
            }
        }
    }

    options.problem_statement = words.join(" ");
    if options.problem_statement.trim().is_empty() {
        return Err("run requires a problem statement".to_string());
    }
    Ok(options)
}

/// Runs all seven stages for one session. On failure the sections produced so
/// far are kept in the error text ahead of the failure.
pub fn execute_run<C: CompletionClient, A: AuditSink>(
    runner: &mut StageRunner<C, A>,
    session: &mut Session,
    options: &RunOptions,
    credential: Option<&str>,
) -> Result<String, String> {
    runner
        .enter_credential(session, credential)
        .map_err(|err| err.to_string())?;
    if let Some(student_id) = &options.student_id {
        session.set_student_id(student_id);
    }
    if let Some(model) = &options.model {
        runner
            .select_model(session, model)
            .map_err(|err| err.to_string())?;
    }
    session.set_problem_statement(&options.problem_statement);

    let mut sections = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        match runner.run_stage(session, stage) {
            Ok(outcome) => sections.push(render_outcome(&outcome)),
            Err(err) => {
                sections.push(format!("error: {err}"));
                return Err(sections.join("\n\n"));
            }
        }
    }
    Ok(sections.join("\n\n"))
}

pub fn cmd_run(args: &[String]) -> Result<String, String> {
    let options = parse_run_args(args)?;
    let paths = ensure_runtime_root()?;
    let settings = load_settings_or_err(&paths)?;
    let mut runner = build_live_runner(&paths, &settings)?;
    let mut session = new_session(&settings)?;
    let credential = credential_from_env();
    execute_run(&mut runner, &mut session, &options, credential.as_deref())
}
