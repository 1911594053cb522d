//! Export of parsed résumés as JSON, XML or a CSV table.
//!
//! JSON and XML render through the default template of their format; each
//! `{{placeholder}}` is replaced by the résumé value, escaped for the target
//! format. Without a template a built-in layout is used.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::task::{ParseTask, ParsedResume, ResumeFileStatus};
use crate::models::template::ExportTemplate;
use crate::store::StoreError;

/// Placeholders understood by export templates, in table column order.
pub const PLACEHOLDERS: [&str; 14] = [
    "name",
    "phone",
    "email",
    "school",
    "degree",
    "major",
    "startDate",
    "endDate",
    "company",
    "position",
    "responsibility",
    "achievement",
    "targetPosition",
    "matchScore",
];

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Xml,
    Table,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json; charset=utf-8",
            ExportFormat::Xml => "application/xml; charset=utf-8",
            ExportFormat::Table => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
            ExportFormat::Table => "csv",
        }
    }
}

/// Body of `POST /tasks/:id/export`. Without `resumeId` every successfully
/// parsed résumé of the task is exported.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub resume_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Picks the résumés an export covers. Only successful parses qualify.
pub fn select<'a>(
    task: &'a ParseTask,
    resume_id: Option<&str>,
) -> Result<Vec<&'a ParsedResume>, AppError> {
    if let Some(id) = resume_id {
        let resume = task.resume(id).ok_or_else(|| StoreError::NotFound {
            kind: "resume",
            id: id.to_string(),
        })?;
        if resume.status != ResumeFileStatus::Success {
            return Err(AppError::Conflict(format!(
                "résumé '{id}' has not been parsed successfully and cannot be exported"
            )));
        }
        return Ok(vec![resume]);
    }
    let parsed: Vec<_> = task
        .resumes
        .iter()
        .filter(|r| r.status == ResumeFileStatus::Success)
        .collect();
    if parsed.is_empty() {
        return Err(AppError::Conflict(format!(
            "task '{}' has no successfully parsed résumés to export",
            task.id
        )));
    }
    Ok(parsed)
}

/// Looks up one placeholder for `resume`. Education and work fields come from
/// the first entry; list fields are joined with "; ".
pub fn placeholder_value(task: &ParseTask, resume: &ParsedResume, key: &str) -> Option<String> {
    let basic = resume.basic_info.as_ref();
    let education = resume.education.first();
    let work = resume.work_experience.first();
    match key {
        "name" => basic.map(|b| b.name.clone()),
        "phone" => basic.map(|b| b.phone.clone()),
        "email" => basic.map(|b| b.email.clone()),
        "school" => education.map(|e| e.school.clone()),
        "degree" => education.map(|e| e.degree.clone()),
        "major" => education.and_then(|e| e.major.clone()),
        "startDate" => education.map(|e| e.start_date.clone()),
        "endDate" => education.map(|e| e.end_date.clone()),
        "company" => work.map(|w| w.company.clone()),
        "position" => work.map(|w| w.position.clone()),
        "responsibility" => work.map(|w| w.responsibilities.join("; ")),
        "achievement" => work.map(|w| w.achievements.join("; ")),
        "targetPosition" => resume
            .job_intent
            .as_ref()
            .map(|j| j.target_position.clone())
            .or_else(|| task.target_position.clone()),
        "matchScore" => resume.match_score.map(|s| s.to_string()),
        _ => None,
    }
}

/// Escapes `value` for use inside a JSON string literal.
fn escape_json(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitutes every `{{key}}` in `content`. Unknown keys render empty; an
/// unterminated `{{` is copied through unchanged.
pub fn render(
    content: &str,
    lookup: impl Fn(&str) -> Option<String>,
    escape: fn(&str) -> String,
) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        if let Some(value) = lookup(after[..end].trim()) {
            out.push_str(&escape(&value));
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn render_json(
    task: &ParseTask,
    resumes: &[&ParsedResume],
    template: Option<&ExportTemplate>,
) -> Result<String, AppError> {
    let Some(template) = template else {
        let body = if let [single] = resumes {
            serde_json::to_string_pretty(single)
        } else {
            serde_json::to_string_pretty(resumes)
        };
        return body
            .context("Failed to serialize résumé export")
            .map_err(AppError::from);
    };
    let rendered: Vec<String> = resumes
        .iter()
        .map(|r| render(&template.content, |k| placeholder_value(task, r, k), escape_json))
        .collect();
    Ok(match rendered.as_slice() {
        [single] => single.clone(),
        many => format!("[\n{}\n]", many.join(",\n")),
    })
}

fn builtin_xml(task: &ParseTask, resume: &ParsedResume) -> String {
    let mut out = String::from("<resume>\n");
    for key in PLACEHOLDERS {
        let value = placeholder_value(task, resume, key).unwrap_or_default();
        out.push_str(&format!("  <{key}>{}</{key}>\n", escape_xml(&value)));
    }
    out.push_str("</resume>");
    out
}

fn render_xml(
    task: &ParseTask,
    resumes: &[&ParsedResume],
    template: Option<&ExportTemplate>,
) -> String {
    let documents: Vec<String> = resumes
        .iter()
        .map(|r| match template {
            Some(t) => render(&t.content, |k| placeholder_value(task, r, k), escape_xml),
            None => builtin_xml(task, r),
        })
        .map(|doc| doc.trim().trim_start_matches(XML_DECLARATION).trim().to_string())
        .collect();
    match documents.as_slice() {
        [single] => format!("{XML_DECLARATION}\n{single}"),
        many => format!("{XML_DECLARATION}\n<resumes>\n{}\n</resumes>", many.join("\n")),
    }
}

fn render_table(task: &ParseTask, resumes: &[&ParsedResume]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(std::iter::once("filename").chain(PLACEHOLDERS))
        .context("Failed to write CSV header")?;
    for resume in resumes {
        let row = std::iter::once(resume.filename.clone()).chain(
            PLACEHOLDERS
                .iter()
                .map(|k| placeholder_value(task, resume, k).unwrap_or_default()),
        );
        writer.write_record(row).context("Failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV export: {}", e.error()))?;
    String::from_utf8(bytes)
        .context("CSV export is not valid UTF-8")
        .map_err(AppError::from)
}

/// Renders the export. `template` is the default enabled template for the
/// requested format, if one exists; it is ignored for tables.
pub fn export(
    task: &ParseTask,
    request: &ExportRequest,
    template: Option<&ExportTemplate>,
) -> Result<ExportFile, AppError> {
    let resumes = select(task, request.resume_id.as_deref())?;
    let body = match request.format {
        ExportFormat::Json => render_json(task, &resumes, template)?,
        ExportFormat::Xml => render_xml(task, &resumes, template),
        ExportFormat::Table => render_table(task, &resumes)?,
    };
    let stem = match request.resume_id.as_deref() {
        Some(id) => format!("{}_{}", task.id, id),
        None => task.id.clone(),
    };
    Ok(ExportFile {
        filename: format!("{stem}.{}", request.format.extension()),
        content_type: request.format.content_type(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::template::{FormatType, ToggleStatus};
    use crate::store::seed::sample_tasks;

    fn task(id: &str) -> ParseTask {
        sample_tasks()
            .unwrap()
            .into_iter()
            .find(|t| t.id == id)
            .unwrap()
    }

    fn template(format_type: FormatType, content: &str) -> ExportTemplate {
        ExportTemplate {
            id: "temp-x".to_string(),
            name: "x".to_string(),
            format_type,
            status: ToggleStatus::Enabled,
            description: None,
            content: content.to_string(),
            is_default: true,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(format: ExportFormat, resume_id: Option<&str>) -> ExportRequest {
        ExportRequest {
            format,
            resume_id: resume_id.map(str::to_string),
        }
    }

    #[test]
    fn test_render_replaces_and_blanks_unknown() {
        let out = render(
            "Hi {{ name }}, {{unknown}}! {{broken",
            |k| (k == "name").then(|| "张三".to_string()),
            escape_xml,
        );
        assert_eq!(out, "Hi 张三, ! {{broken");
    }

    #[test]
    fn test_json_template_output_is_valid_json() {
        let mut t = task("task-001");
        if let Some(info) = t.resumes[0].basic_info.as_mut() {
            info.name = "张\"三\"".to_string();
        }
        let tpl = template(
            FormatType::Json,
            r#"{"name": "{{name}}", "school": "{{school}}", "score": "{{matchScore}}"}"#,
        );
        let file = export(&t, &request(ExportFormat::Json, None), Some(&tpl)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&file.body).unwrap();
        assert_eq!(value["name"], "张\"三\"");
        assert_eq!(value["school"], "清华大学");
        assert_eq!(value["score"], "78");
        assert_eq!(file.filename, "task-001.json");
    }

    #[test]
    fn test_xml_values_are_escaped() {
        let mut t = task("task-001");
        if let Some(work) = t.resumes[0].work_experience.first_mut() {
            work.company = "R&D <Lab>".to_string();
        }
        let tpl = template(
            FormatType::Xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<resume><company>{{company}}</company></resume>",
        );
        let file = export(&t, &request(ExportFormat::Xml, Some("res-001")), Some(&tpl)).unwrap();
        assert!(file.body.contains("<company>R&amp;D &lt;Lab&gt;</company>"));
        assert_eq!(file.body.matches("<?xml").count(), 1);
        assert_eq!(file.filename, "task-001_res-001.xml");
    }

    #[test]
    fn test_failed_resume_cannot_be_exported() {
        let t = task("task-002");
        let err = export(&t, &request(ExportFormat::Json, Some("res-201")), None).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = export(&t, &request(ExportFormat::Json, Some("res-999")), None).unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_batch_export_skips_failed_resumes() {
        let t = task("task-002");
        let file = export(&t, &request(ExportFormat::Table, None), None).unwrap();
        let lines: Vec<&str> = file.body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("filename,name,phone,email"));
        assert!(lines[1].starts_with("李四_简历.pdf,李四"));
        assert_eq!(file.content_type, "text/csv; charset=utf-8");
    }

    #[test]
    fn test_builtin_json_without_template() {
        let t = task("task-003");
        let file = export(&t, &request(ExportFormat::Json, None), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&file.body).unwrap();
        assert_eq!(value["basicInfo"]["name"], "王五");
    }

    #[test]
    fn test_builtin_xml_lists_every_placeholder() {
        let t = task("task-001");
        let file = export(&t, &request(ExportFormat::Xml, None), None).unwrap();
        for key in PLACEHOLDERS {
            assert!(file.body.contains(&format!("<{key}>")), "{key}");
        }
        assert!(file.body.contains("<targetPosition>AI产品经理</targetPosition>"));
    }
}
