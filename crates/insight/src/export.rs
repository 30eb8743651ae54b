use crate::types::{ArchitectureSummary, FileInsight};

pub const EXPORT_FILE_NAME: &str = "project-summary.md";

const NO_SUMMARY: &str = "No project summary available.";

/// Flat Markdown document: heading, project summary, one section per file.
pub fn export_summary(summary: Option<&ArchitectureSummary>, files: &[FileInsight]) -> String {
    let mut md = String::new();
    md.push_str("# Project Summary\n\n");

    let text = summary
        .map(|s| s.project_summary.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUMMARY);
    md.push_str(text);
    md.push_str("\n\n");

    if let Some(summary) = summary {
        let stats = &summary.stats;
        md.push_str(&format!(
            "- Files: {} ({} frontend, {} backend)\n- Imports: {}\n- Exports: {}\n\n",
            stats.total_files,
            stats.frontend_files,
            stats.backend_files,
            stats.total_imports,
            stats.total_exports
        ));
    }

    md.push_str("## Files\n\n");
    let sections: Vec<String> = files.iter().map(file_section).collect();
    md.push_str(&sections.join("\n"));
    md
}

fn file_section(file: &FileInsight) -> String {
    let role = if file.role.description.trim().is_empty() {
        file.role.category.label()
    } else {
        file.role.description.trim()
    };
    format!(
        "### {}\n- **Role:** {}\n- **Category:** {}\n- **Path:** {}\n- **Summary:** {}\n",
        file.name(),
        role,
        file.role.category,
        file.path,
        file.role.summary
    )
}

/// Plain-text block for copying one file's details.
pub fn file_details_text(file: &FileInsight) -> String {
    let mut text = format!(
        "{}\nRole: {}\nCategory: {}\nPath: {}\nSummary: {}\n",
        file.name(),
        file.role.description,
        file.role.category,
        file.path,
        file.role.summary
    );
    if let Some(stats) = &file.lifecycle {
        text.push_str(&format!(
            "Commits: {} (+{}, -{})\n",
            stats.total_commits, stats.total_additions, stats.total_deletions
        ));
    }
    text
}
