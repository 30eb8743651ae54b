use codelore_diagram::DiagramState;
use codelore_insight::presentation::{change_glyph, tone, FileKind, Label};
use codelore_insight::{
    file_details_text, ArchitectureSummary, Category, FileInsight, FilterSummary, TimelineEntry,
};

fn paint(label: impl Into<Label>, text: &str, color: bool) -> String {
    if color {
        tone(label).paint(text)
    } else {
        text.to_string()
    }
}

pub fn render_categories(present: &[Category], color: bool) -> String {
    let mut out = String::new();
    for category in present {
        out.push_str(&paint(*category, category.label(), color));
        out.push('\n');
    }
    out
}

pub fn render_file_list(files: &[&FileInsight], summary: FilterSummary, color: bool) -> String {
    let mut out = String::new();
    let width = files.iter().map(|f| f.path.len()).max().unwrap_or(0);
    for file in files {
        out.push_str(&format!(
            "{} {:<width$}  {}  {} commits\n",
            FileKind::from_path(&file.path).tag(),
            file.path,
            paint(file.category(), file.category().label(), color),
            file.history.len(),
        ));
    }
    out.push_str(&format!("\n{summary}\n"));
    out
}

pub fn render_file_details(file: &FileInsight, color: bool) -> String {
    let mut out = file_details_text(file);
    out.push_str(&format!("Complexity: {}\n", file.role.complexity.as_str()));
    if !file.role.key_functions.is_empty() {
        out.push_str(&format!(
            "Key functions: {}\n",
            file.role.key_functions.join(", ")
        ));
    }

    if !file.connections.is_empty() {
        out.push_str("\nImports\n");
        for path in &file.connections.imports_internal {
            out.push_str(&format!("  -> {path}\n"));
        }
        out.push_str("Imported by\n");
        for path in &file.connections.imported_by {
            out.push_str(&format!("  <- {path}\n"));
        }
    }

    if !file.history.is_empty() {
        out.push_str("\nHistory\n");
        for change in &file.history {
            out.push_str(&format!(
                "  {} {} {} {} (+{} -{}) {}\n",
                paint(change.change_type, change_glyph(change.change_type), color),
                change.short_id(),
                change.timestamp,
                change.author,
                change.additions,
                change.deletions,
                change.summary,
            ));
        }
    }
    out
}

pub fn render_timeline(entries: &[TimelineEntry<'_>], color: bool) -> String {
    if entries.is_empty() {
        return "No changes recorded.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let change = entry.change;
        out.push_str(&format!(
            "{} {}  {}  {}  {}\n    {}\n",
            paint(change.change_type, change_glyph(change.change_type), color),
            change.short_id(),
            change.timestamp,
            change.author,
            entry.path,
            change.summary,
        ));
    }
    out
}

pub fn render_architecture(
    summary: &ArchitectureSummary,
    diagram: Option<&DiagramState>,
    color: bool,
) -> String {
    let stats = &summary.stats;
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", summary.repo));
    if !summary.project_summary.trim().is_empty() {
        out.push_str(summary.project_summary.trim());
        out.push_str("\n\n");
    }
    if !summary.details.project_type.is_empty() {
        out.push_str(&format!("Type: {}\n", summary.details.project_type));
    }
    if !summary.details.tech_stack.is_empty() {
        out.push_str(&format!(
            "Tech stack: {}\n",
            summary.details.tech_stack.join(", ")
        ));
    }
    out.push_str(&format!(
        "Files: {} ({} frontend, {} backend), imports: {}, exports: {}\n",
        stats.total_files,
        stats.frontend_files,
        stats.backend_files,
        stats.total_imports,
        stats.total_exports
    ));

    if !summary.key_files.is_empty() {
        out.push_str("\nKey files\n");
        for key in &summary.key_files {
            out.push_str(&format!(
                "  {}  {}\n",
                key.path,
                paint(key.role.category, key.role.category.label(), color)
            ));
        }
    }

    match diagram {
        Some(DiagramState::Rendered { .. }) => out.push_str("\nDiagram rendered.\n"),
        Some(DiagramState::Failed {
            source, message, ..
        }) => {
            out.push_str(&format!("\nDiagram could not be rendered: {message}\n\n"));
            out.push_str(source);
            out.push('\n');
        }
        Some(DiagramState::Empty) => out.push_str("\nNo diagram available.\n"),
        Some(DiagramState::Rendering { .. }) | None => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelore_insight::{ChangeRecord, ChangeType, Connections, FileRole};
    use codelore_protocol::{ArchitectureStats, ProjectDetails};
    use pretty_assertions::assert_eq;

    fn insight(path: &str) -> FileInsight {
        FileInsight {
            path: path.to_string(),
            role: FileRole::placeholder(path),
            history: vec![ChangeRecord {
                commit_id: "0123456789abcdef".to_string(),
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                author: "Ada".to_string(),
                summary: "Initial commit".to_string(),
                change_type: ChangeType::Added,
                additions: 10,
                deletions: 0,
            }],
            connections: Connections::default(),
            lifecycle: None,
        }
    }

    #[test]
    fn file_list_ends_with_summary() {
        let a = insight("src/a.ts");
        let text = render_file_list(&[&a], FilterSummary { shown: 1, total: 3 }, false);
        assert_eq!(text, "js  src/a.ts  Other  1 commits\n\nShowing 1 of 3 files\n");
    }

    #[test]
    fn timeline_uses_short_ids() {
        let a = insight("src/a.ts");
        let entries = vec![TimelineEntry {
            path: &a.path,
            change: &a.history[0],
        }];
        let text = render_timeline(&entries, false);
        assert!(text.starts_with("+ 01234567  2024-01-01T00:00:00Z  Ada  src/a.ts"));
    }

    #[test]
    fn failed_diagram_prints_source() {
        let summary = ArchitectureSummary {
            repo: "https://github.com/o/r".to_string(),
            project_summary: String::new(),
            details: ProjectDetails::default(),
            stats: ArchitectureStats::default(),
            key_files: vec![],
            diagram_source: "graph TD".to_string(),
        };
        let state = DiagramState::Failed {
            request: 1,
            source: "graph TD".to_string(),
            message: "mmdc missing".to_string(),
        };
        let text = render_architecture(&summary, Some(&state), false);
        assert!(text.contains("Diagram could not be rendered: mmdc missing\n\ngraph TD\n"));
    }
}
