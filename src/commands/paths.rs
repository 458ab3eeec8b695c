//! Show where the selected editor keeps its state

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use serde::Serialize;
use std::path::PathBuf;

use editor_id_reset::config::{list_jetbrains_products, EditorProfile, JetBrainsProduct};
use editor_id_reset::session::Session;

/// One resolved artifact and whether it is on disk
#[derive(Debug, Serialize)]
pub struct ArtifactRow {
    pub artifact: &'static str,
    pub path: PathBuf,
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct PathsReport {
    pub editor: EditorProfile,
    pub base: PathBuf,
    pub artifacts: Vec<ArtifactRow>,
    /// Only populated for JetBrains
    pub products: Vec<JetBrainsProduct>,
}

pub fn collect(session: &Session) -> Result<PathsReport> {
    let paths = session.paths()?;

    let artifacts = paths
        .artifacts
        .iter()
        .map(|a| ArtifactRow {
            artifact: a.kind.label(),
            exists: a.path.exists(),
            path: a.path.clone(),
        })
        .collect();

    let products = if session.profile.is_jetbrains() {
        list_jetbrains_products(&paths.base)
    } else {
        Vec::new()
    };

    Ok(PathsReport {
        editor: session.profile,
        base: paths.base,
        artifacts,
        products,
    })
}

pub fn format_table(report: &PathsReport) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Artifact"), Cell::new("Path"), Cell::new("Exists")]);

    for row in &report.artifacts {
        table.add_row(vec![
            Cell::new(row.artifact),
            Cell::new(row.path.display()),
            Cell::new(if row.exists { "yes" } else { "no" }),
        ]);
    }

    let mut output = format!("{} ({})\n", report.editor.display_name(), report.base.display());
    output.push_str(&table.to_string());

    if report.editor.is_jetbrains() {
        if report.products.is_empty() {
            output.push_str("\n\nNo JetBrains products found");
        } else {
            output.push_str(&format!("\n\n{} JetBrains products found:", report.products.len()));
            for product in &report.products {
                output.push_str(&format!("\n  {}", product.name));
            }
        }
    }

    output
}
