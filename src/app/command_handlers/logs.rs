use crate::app::command_support::{ensure_runtime_root, load_settings_or_err, open_audit_log};
use crate::audit::AuditRecord;
use chrono::{TimeZone, Utc};

pub fn parse_logs_args(args: &[String]) -> Result<Option<usize>, String> {
    match args {
        [] => Ok(None),
        [flag, value] if flag == "--limit" => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| format!("--limit expects a non-negative integer, got `{value}`")),
        [flag] if flag == "--limit" => Err("--limit requires a value".to_string()),
        [other, ..] => Err(format!("unexpected argument `{other}`")),
    }
}

fn format_timestamp(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

pub fn render_audit_records(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "no audit records".to_string();
    }
    records
        .iter()
        .map(|record| {
            format!(
                "#{} {} user={} student={} model={} action={} details={}",
                record.id,
                format_timestamp(record.timestamp),
                record.user_id,
                record.student_id,
                record.model_name,
                record.action,
                record.details
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cmd_logs(args: &[String]) -> Result<String, String> {
    let limit = parse_logs_args(args)?;
    let paths = ensure_runtime_root()?;
    let settings = load_settings_or_err(&paths)?;
    let audit = open_audit_log(&paths, &settings)?;
    let records = audit.list(limit).map_err(|err| err.to_string())?;
    Ok(render_audit_records(&records))
}
