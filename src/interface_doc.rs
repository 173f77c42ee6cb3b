//! Markdown interface maps for a directory of C# scripts.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{GidError, Result};
use crate::interface_map::{self, ClassInfo, EnumInfo, FileInfo, MethodInfo};

/// Counts reported after a mapping run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSummary {
    pub output_dir: PathBuf,
    pub files_found: usize,
    pub maps_written: usize,
    /// Scripts that could not be read.
    pub skipped: Vec<PathBuf>,
    pub source_bytes: u64,
    pub map_bytes: u64,
}

impl MapSummary {
    /// Map size as a percentage of source size.
    pub fn ratio(&self) -> f64 {
        if self.source_bytes == 0 {
            0.0
        } else {
            self.map_bytes as f64 / self.source_bytes as f64 * 100.0
        }
    }
}

fn code_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|i| format!("`{}`", i.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn method_line(method: &MethodInfo, mods: &[&str]) -> String {
    if mods.is_empty() {
        format!("- `{}`", method.signature())
    } else {
        format!("- `{}` *[{}]*", method.signature(), mods.join(", "))
    }
}

fn push_enum(lines: &mut Vec<String>, heading: &str, info: &EnumInfo) {
    lines.push(format!("{} enum `{}`", heading, info.name));
    lines.push(format!("Values: {}", code_list(&info.values)));
    lines.push(String::new());
}

fn push_class(lines: &mut Vec<String>, class: &ClassInfo) {
    let mut header = format!("## {} ", class.access);
    for (set, word) in [
        (class.is_abstract, "abstract"),
        (class.is_static, "static"),
        (class.is_partial, "partial"),
    ] {
        if set {
            header.push_str(word);
            header.push(' ');
        }
    }
    header.push_str(&format!("{} `{}`", class.kind.keyword(), class.name));
    if !class.base_classes.is_empty() {
        header.push_str(&format!(" : {}", code_list(&class.base_classes)));
    }
    lines.push(header);
    lines.push(String::new());

    for nested in &class.enums {
        push_enum(lines, "###", nested);
    }

    let field_tables = [
        ("### Public Fields", true),
        ("### Serialized Fields (Inspector)", false),
    ];
    for (title, public) in field_tables {
        let fields: Vec<_> = class
            .fields
            .iter()
            .filter(|f| (f.access == "public") == public)
            .collect();
        if fields.is_empty() {
            continue;
        }
        lines.push(title.to_string());
        lines.push("| Type | Name | Notes |".to_string());
        lines.push("|------|------|-------|".to_string());
        for field in fields {
            let mut notes = Vec::new();
            if field.is_static {
                notes.push("static".to_string());
            }
            if field.is_readonly {
                notes.push("readonly".to_string());
            }
            if let Some(default) = &field.default_value {
                notes.push(format!("= {}", default));
            }
            lines.push(format!(
                "| `{}` | `{}` | {} |",
                field.type_name,
                field.name,
                notes.join(", ")
            ));
        }
        lines.push(String::new());
    }

    if !class.properties.is_empty() {
        lines.push("### Properties".to_string());
        lines.push("| Type | Name | get | set | Notes |".to_string());
        lines.push("|------|------|-----|-----|-------|".to_string());
        let mark = |on: bool| if on { "✓" } else { "—" };
        for prop in &class.properties {
            lines.push(format!(
                "| `{}` | `{}` | {} | {} | {} |",
                prop.type_name,
                prop.name,
                mark(prop.has_getter),
                mark(prop.has_setter),
                if prop.is_static { "static" } else { "" }
            ));
        }
        lines.push(String::new());
    }

    let lifecycle: Vec<&str> = class.lifecycle_methods().map(|m| m.name.as_str()).collect();
    if !lifecycle.is_empty() {
        lines.push("### Unity Lifecycle".to_string());
        lines.push(code_list(&lifecycle));
        lines.push(String::new());
    }

    let public: Vec<_> = class.public_methods().collect();
    if !public.is_empty() {
        lines.push("### Public Methods".to_string());
        for method in public {
            let mods: Vec<&str> = [
                (method.is_static, "static"),
                (method.is_async, "async"),
                (method.is_coroutine, "coroutine"),
                (method.is_virtual, "virtual"),
                (method.is_override, "override"),
            ]
            .into_iter()
            .filter_map(|(set, word)| set.then_some(word))
            .collect();
            lines.push(method_line(method, &mods));
        }
        lines.push(String::new());
    }

    let overridable: Vec<_> = class.overridable_methods().collect();
    if !overridable.is_empty() {
        lines.push("### Overridable (protected/internal)".to_string());
        for method in overridable {
            let mods: Vec<&str> = [(method.is_virtual, "virtual"), (method.is_abstract, "abstract")]
                .into_iter()
                .filter_map(|(set, word)| set.then_some(word))
                .collect();
            lines.push(method_line(method, &mods));
        }
        lines.push(String::new());
    }
}

/// Interface map for one script.
pub fn render_file(info: &FileInfo) -> String {
    let mut lines = vec![format!("# {}", info.filename), String::new()];

    if let Some(namespace) = &info.namespace {
        lines.push(format!("**Namespace:** `{}`", namespace));
        lines.push(String::new());
    }
    if !info.dependencies.is_empty() {
        lines.push(format!("**Depends on:** {}", code_list(&info.dependencies)));
        lines.push(String::new());
    }
    for top in &info.top_level_enums {
        push_enum(&mut lines, "##", top);
    }
    for class in &info.classes {
        push_class(&mut lines, class);
    }

    lines.join("\n")
}

fn sorted_by_name(files: &[FileInfo]) -> Vec<&FileInfo> {
    let mut sorted: Vec<_> = files.iter().collect();
    sorted.sort_by_key(|f| f.filename.to_lowercase());
    sorted
}

/// Project index: script table, dependency edges, method quick reference and enums.
pub fn render_readme(files: &[FileInfo]) -> String {
    let sorted = sorted_by_name(files);
    let mut lines = vec![
        "# Project Interface Map".to_string(),
        String::new(),
        format!("Auto-generated API surface for **{}** C# scripts.", files.len()),
        "Each linked file lists the public API, serialized fields, dependencies".to_string(),
        "and Unity lifecycle hooks of one script.".to_string(),
        String::new(),
        "## Script Index".to_string(),
        String::new(),
        "| Script | Classes | Base | Depends On |".to_string(),
        "|--------|---------|------|------------|".to_string(),
    ];

    for file in &sorted {
        let classes: Vec<&str> = file.classes.iter().map(|c| c.name.as_str()).collect();
        let bases: BTreeSet<&str> = file
            .classes
            .iter()
            .flat_map(|c| c.base_classes.iter().map(String::as_str))
            .collect();
        let bases: Vec<&str> = bases.into_iter().collect();
        let or_dash = |s: String| if s.is_empty() { "—".to_string() } else { s };
        lines.push(format!(
            "| [{}]({}) | {} | {} | {} |",
            file.filename,
            file.map_name(),
            code_list(&classes),
            or_dash(code_list(&bases)),
            or_dash(code_list(&file.dependencies)),
        ));
    }
    lines.push(String::new());

    lines.push("## Dependency Graph (Adjacency)".to_string());
    lines.push("```".to_string());
    for file in &sorted {
        for dep in &file.dependencies {
            lines.push(format!("{} -> {}", file.stem(), dep));
        }
    }
    lines.push("```".to_string());
    lines.push(String::new());

    lines.push("## All Public Methods (Quick Reference)".to_string());
    lines.push(String::new());
    for file in &sorted {
        for class in &file.classes {
            let methods: Vec<_> = class.public_methods().collect();
            if methods.is_empty() {
                continue;
            }
            lines.push(format!("### `{}`", class.name));
            for method in methods {
                lines.push(method_line(method, &[]));
            }
            lines.push(String::new());
        }
    }

    let mut enums: Vec<(&str, Option<&str>, &EnumInfo)> = Vec::new();
    for file in files {
        for top in &file.top_level_enums {
            enums.push((file.filename.as_str(), None, top));
        }
        for class in &file.classes {
            for nested in &class.enums {
                enums.push((file.filename.as_str(), Some(class.name.as_str()), nested));
            }
        }
    }
    if !enums.is_empty() {
        enums.sort_by(|a, b| a.2.name.cmp(&b.2.name));
        lines.push("## All Enums".to_string());
        lines.push(String::new());
        for (filename, owner, info) in enums {
            let scope = owner.map(|o| format!("{}.", o)).unwrap_or_default();
            lines.push(format!(
                "- **{}{}**: {}  *(in {})*",
                scope,
                info.name,
                code_list(&info.values),
                filename
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// `.cs` files under `dir`, recursively, in file-name order.
pub fn find_scripts(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "script_walk_error");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "cs"))
        .collect()
}

/// Parses every script under `input_dir` and writes one map per script plus `README.md`.
///
/// Nothing is written when no scripts are found.
pub fn generate_maps(input_dir: &Path, output_dir: &Path) -> Result<MapSummary> {
    if !input_dir.is_dir() {
        return Err(GidError::NotADirectory {
            path: input_dir.to_path_buf(),
        });
    }

    let scripts = find_scripts(input_dir);
    let mut summary = MapSummary {
        output_dir: output_dir.to_path_buf(),
        files_found: scripts.len(),
        maps_written: 0,
        skipped: Vec::new(),
        source_bytes: 0,
        map_bytes: 0,
    };
    if scripts.is_empty() {
        info!(input = %input_dir.display(), "map_no_scripts");
        return Ok(summary);
    }

    let mut parsed = Vec::new();
    for path in &scripts {
        match interface_map::parse_file(path) {
            Ok(info) => {
                summary.source_bytes += fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                parsed.push(info);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "script_parse_failed");
                summary.skipped.push(path.clone());
            }
        }
    }

    let stems: BTreeSet<String> = parsed.iter().map(|f| f.stem().to_string()).collect();
    for info in &mut parsed {
        info.dependencies = interface_map::project_dependencies(info, &stems);
    }

    fs::create_dir_all(output_dir)?;
    for info in &parsed {
        let doc = render_file(info);
        fs::write(output_dir.join(info.map_name()), &doc)?;
        summary.map_bytes += doc.len() as u64;
        summary.maps_written += 1;
        debug!(file = %info.filename, classes = info.classes.len(), "interface_map_written");
    }

    let readme = render_readme(&parsed);
    fs::write(output_dir.join("README.md"), &readme)?;
    summary.map_bytes += readme.len() as u64;

    info!(
        files_found = summary.files_found,
        maps_written = summary.maps_written,
        skipped = summary.skipped.len(),
        source_bytes = summary.source_bytes,
        map_bytes = summary.map_bytes,
        "map_complete"
    );
    Ok(summary)
}

/// Formats `n` with comma thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
