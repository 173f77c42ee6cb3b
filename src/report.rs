//! Text and JSON rendering of validation results.

use std::fmt::Write as _;

use unicode_width::UnicodeWidthStr;

use crate::error::Result;
use crate::mode::{ModeResolution, OpenReason};
use crate::registry::{SectionKind, Template, TemplateId};
use crate::validator::ValidationReport;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Pads `s` with spaces to `width` display columns.
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

/// Plain two-space-separated table with a dashed rule under the header.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let render_row = |cells: Vec<String>| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| pad(c, w))
            .collect::<Vec<_>>()
            .join("  ");
        format!("  {}\n", line.trim_end())
    };

    let mut out = render_row(headers.iter().map(|h| h.to_string()).collect());
    out.push_str(&render_row(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        out.push_str(&render_row(row.clone()));
    }
    out
}

fn reason_label(reason: &OpenReason) -> String {
    match reason {
        OpenReason::Absent => "absent".to_string(),
        OpenReason::Deferred(marker) => format!("deferred ({})", marker),
        OpenReason::MultipleOptions => "multiple options".to_string(),
    }
}

fn write_resolution(out: &mut String, template: TemplateId, resolution: &ModeResolution) {
    let _ = writeln!(out, "Template: {}", template.label());
    let _ = write!(out, "Mode:     {}", resolution.mode);
    if template == TemplateId::Gid {
        let _ = write!(out, " ({} open decisions)", resolution.open.len());
    }
    if resolution.vacuous {
        out.push_str(" [empty draft]");
    }
    out.push('\n');

    if !resolution.open.is_empty() {
        out.push_str("\nOpen decisions:\n");
        let rows: Vec<Vec<String>> = resolution
            .open
            .iter()
            .map(|d| vec![d.category.label().to_string(), reason_label(&d.reason)])
            .collect();
        out.push_str(&table(&["Category", "Reason"], &rows));
    }
}

/// Human-readable report.
pub fn render_text(report: &ValidationReport, verbose: bool) -> String {
    let mut out = String::new();
    write_resolution(&mut out, report.template, &report.resolution);

    if !report.missing.is_empty() {
        out.push_str("\nMissing required sections:\n");
        for missing in &report.missing {
            let marker = if missing.star { "★ " } else { "" };
            let _ = writeln!(out, "  - {}{}", marker, missing.section);
        }
    }

    if !report.findings.is_empty() {
        out.push_str("\nFindings:\n");
        for (i, finding) in report.findings.iter().enumerate() {
            let _ = writeln!(out, "  {}. [{}] {}", i + 1, finding.tag, finding.text);
            let _ = writeln!(out, "     Consequence: {}", finding.consequence);
            let _ = writeln!(out, "     Rule: {}", finding.rule);
        }
    }

    if verbose && !report.skipped.is_empty() {
        out.push_str("\nSkipped rules:\n");
        for skipped in &report.skipped {
            let _ = writeln!(out, "  - {} (no {})", skipped.rule, skipped.missing);
        }
    }

    let _ = writeln!(
        out,
        "\nResult: {} ({} missing, {} internal, {} external)",
        if report.passed() { "PASS" } else { "FAIL" },
        report.missing.len(),
        report.internal_count(),
        report.external_count()
    );
    out
}

pub fn render_json(report: &ValidationReport) -> Result<String> {
    let mut value = serde_json::to_value(report)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("passed".to_string(), report.passed().into());
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn render_mode_text(template: TemplateId, resolution: &ModeResolution) -> String {
    let mut out = String::new();
    write_resolution(&mut out, template, resolution);
    out
}

pub fn render_mode_json(template: TemplateId, resolution: &ModeResolution) -> Result<String> {
    let mut value = serde_json::to_value(resolution)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("template".to_string(), serde_json::to_value(template)?);
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// One line per template: slug, label, section counts.
pub fn render_template_list(templates: &[Template]) -> String {
    let rows: Vec<Vec<String>> = templates
        .iter()
        .map(|t| {
            let stars = t.sections.iter().filter(|s| s.star).count();
            vec![
                t.id.slug().to_string(),
                t.id.label().to_string(),
                t.sections.len().to_string(),
                stars.to_string(),
                t.rules.len().to_string(),
            ]
        })
        .collect();
    table(&["Id", "Name", "Sections", "Star", "Rules"], &rows)
}

/// Section schema of a template, in order.
pub fn render_schema(template: &Template) -> String {
    let rows: Vec<Vec<String>> = template
        .sections
        .iter()
        .map(|s| {
            let status = if s.star {
                "★ star"
            } else if s.required {
                "required"
            } else {
                "optional"
            };
            let kind = match s.kind {
                SectionKind::Text => "text",
                SectionKind::Pillars => "pillars",
            };
            vec![
                s.name.to_string(),
                status.to_string(),
                kind.to_string(),
                s.aliases.join(", "),
            ]
        })
        .collect();

    let mut out = format!("{} sections:\n", template.id.label());
    out.push_str(&table(&["Section", "Status", "Kind", "Aliases"], &rows));
    if !template.rules.is_empty() {
        out.push_str("\nRules:\n");
        for rule in &template.rules {
            let _ = writeln!(
                out,
                "  - {} ({} / {})",
                rule.id, rule.sections.0, rule.sections.1
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;
    use crate::registry::TemplateRegistry;
    use crate::validator::Validator;

    fn template(id: TemplateId) -> &'static Template {
        TemplateRegistry::global().unwrap().template(id).unwrap()
    }

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("★ a", 5), "★ a  ");
        assert_eq!(pad("abcdef", 3), "abcdef");
    }

    #[test]
    fn test_table_aligns_columns() {
        let out = table(
            &["A", "B"],
            &[vec!["long value".to_string(), "x".to_string()]],
        );
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "  A           B");
        assert_eq!(lines[1], "  ----------  -");
        assert_eq!(lines[2], "  long value  x");
    }

    #[test]
    fn test_render_text_for_empty_draft() {
        let report = Validator::default().check(&Draft::new(), template(TemplateId::Gid));
        let text = render_text(&report, true);
        assert!(text.contains("Template: GID"));
        assert!(text.contains("Mode:     ABBREVIATED"));
        assert!(text.contains("[empty draft]"));
        assert!(text.contains("★ Design Pillars"));
        assert!(text.contains("Skipped rules:"));
        assert!(text.contains("Result: FAIL (7 missing, 0 internal, 0 external)"));
    }

    #[test]
    fn test_render_text_hides_skipped_unless_verbose() {
        let report = Validator::default().check(&Draft::new(), template(TemplateId::Gid));
        assert!(!render_text(&report, false).contains("Skipped rules:"));
    }

    #[test]
    fn test_render_json_fields() {
        let report =
            Validator::default().check(&Draft::new(), template(TemplateId::ProjectSnapshot));
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(json["template"], "PROJECT_SNAPSHOT");
        assert_eq!(json["mode"], "FULL");
        assert_eq!(json["passed"], false);
        assert_eq!(json["missing"][0]["section"], "Project");
        assert!(json["findings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_render_mode_json() {
        let mut draft = Draft::new();
        draft.set_text("Genre", "TBD");
        let resolution = Validator::default()
            .resolver()
            .resolve(&draft, template(TemplateId::Gid));
        let json: serde_json::Value = serde_json::from_str(
            &render_mode_json(TemplateId::Gid, &resolution).unwrap(),
        )
        .unwrap();
        assert_eq!(json["template"], "GID");
        assert_eq!(json["mode"], "FULL");
        assert_eq!(json["open"][0]["category"], "genre");
        assert_eq!(json["open"][0]["reason"]["reason"], "deferred");
        assert_eq!(json["open"][0]["reason"]["detail"], "TBD");
    }

    #[test]
    fn test_render_template_list() {
        let out = render_template_list(TemplateRegistry::global().unwrap().templates());
        assert!(out.contains("gid-adversarial"));
        assert!(out.contains("PROJECT_SNAPSHOT"));
        assert!(out.lines().any(|l| l.contains("gid ") && l.contains("16")));
    }

    #[test]
    fn test_render_schema_lists_rules() {
        let out = render_schema(template(TemplateId::Gid));
        assert!(out.starts_with("GID sections:"));
        assert!(out.contains("Design Pillars"));
        assert!(out.contains("pillars"));
        assert!(out.contains("pillars-vs-core-loop (Design Pillars / Core Loop)"));
    }
}
