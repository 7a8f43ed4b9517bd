use std::fmt::Write;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::content;
use crate::domain::{DashboardConfig, DashboardError};
use crate::model::{RecordTable, TableColumn};
use crate::styling::RuleSet;

pub const MAP_FRAME_WIDTH: usize = 1000;
pub const MAP_FRAME_HEIGHT: usize = 600;

const PAGE_CSS: &str = r#"
.records-wrapper { overflow-x: auto; min-width: 100%; }
.records { min-width: 100%; }
.records th, .records td { text-align: center; padding: 4px 8px; }
.records th { cursor: pointer; white-space: nowrap; background: #fafafa; }
.records th[data-order="asc"]::after { content: " \25B2"; }
.records th[data-order="desc"]::after { content: " \25BC"; }
.records .fixed { position: sticky; left: 0; z-index: 1; background: #fafafa; }
.records thead th { position: sticky; top: 0; z-index: 2; }
.records thead th.fixed { z-index: 3; }
"#;

const SORT_JS: &str = r#"
function sortRecords(idx, numeric) {
  const table = document.getElementById('records');
  const header = table.tHead.rows[0];
  const th = header.cells[idx];
  const asc = th.dataset.order !== 'asc';
  for (const cell of header.cells) { delete cell.dataset.order; }
  th.dataset.order = asc ? 'asc' : 'desc';
  const body = table.tBodies[0];
  const rows = Array.from(body.rows);
  rows.sort((a, b) => {
    const x = a.cells[idx].textContent;
    const y = b.cells[idx].textContent;
    if (numeric) {
      const fx = parseFloat(x);
      const fy = parseFloat(y);
      if (isNaN(fx) || isNaN(fy)) { return isNaN(fx) - isNaN(fy); }
      return asc ? fx - fy : fy - fx;
    }
    return asc ? x.localeCompare(y) : y.localeCompare(x);
  });
  rows.forEach(r => body.appendChild(r));
}
"#;

/// The pre-generated map page, embedded verbatim into the dashboard.
#[derive(Debug, Clone)]
pub struct MapArtifact {
    path: PathBuf,
    html: String,
}

impl MapArtifact {
    pub fn read(path: &Path) -> Result<Self, DashboardError> {
        let metadata = fs::metadata(path).map_err(|e| Self::map_io_error(path, e))?;
        if !metadata.is_file() {
            return Err(DashboardError::FileNotFound(path.to_path_buf()));
        }
        let html = fs::read_to_string(path).map_err(|e| Self::map_io_error(path, e))?;
        debug!("Read map artifact {} ({} bytes)", path.display(), html.len());
        Ok(MapArtifact {
            path: path.to_path_buf(),
            html,
        })
    }

    #[cfg(test)]
    pub fn from_html(html: impl Into<String>) -> Self {
        MapArtifact {
            path: PathBuf::new(),
            html: html.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    fn map_io_error(path: &Path, e: std::io::Error) -> DashboardError {
        match e.kind() {
            ErrorKind::NotFound => DashboardError::FileNotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => DashboardError::PermissionDenied(path.to_path_buf()),
            _ => DashboardError::IoError(e),
        }
    }
}

/// Everything the page is built from. Created once at startup and never
/// changed afterwards.
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: RecordTable,
    rules: RuleSet,
    map: MapArtifact,
}

impl Dashboard {
    /// Loads the dataset, derives the highlight rules and reads the map.
    /// Any failure aborts before a page exists.
    pub async fn init(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let table = RecordTable::fetch(config).await?;
        let numeric = table.numeric_view()?;
        let rules = RuleSet::from_view(&numeric)?;
        let map = MapArtifact::read(&config.map_path)?;
        info!(
            "Dashboard ready: {} ({} rows keyed by {}, {} columns, {} highlight rules), map {}",
            table.name(),
            table.height(),
            table.key(),
            table.columns().len(),
            rules.len(),
            map.path().display()
        );
        Ok(Dashboard::new(table, rules, map))
    }

    pub fn new(table: RecordTable, rules: RuleSet, map: MapArtifact) -> Self {
        Dashboard { table, rules, map }
    }

    pub fn render(&self) -> String {
        let start_time = Instant::now();
        let page = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="{bootstrap}">
    <style>{css}</style>
</head>
<body>
<div class="container">
    <h1 class="mb-2" style="padding: 10px 10px; text-align: center;">{title}</h1>
    <div class="row"><div class="col"><p class="mb-2" style="padding: 10px 10px;">{intro}</p></div></div>
    {map}
    <figcaption class="mb-2" style="padding: 10px 10px; text-align: center;">{map_caption}</figcaption>
    {relationships}
    <figcaption class="mb-2" style="margin-bottom: 1em; padding: 10px 10px; text-align: center;">{table_caption}</figcaption>
    <div class="row"><div class="col">{table}</div></div>
    {references}
</div>
<script>{js}</script>
</body>
</html>"#,
            title = html_escape(content::PAGE_TITLE),
            bootstrap = content::BOOTSTRAP_CSS,
            css = PAGE_CSS,
            intro = html_escape(content::INTRO),
            map = render_map_frame(&self.map),
            map_caption = html_escape(content::MAP_CAPTION),
            relationships = render_relationships(),
            table_caption = html_escape(content::TABLE_CAPTION),
            table = render_table(&self.table, &self.rules),
            references = render_references(),
            js = SORT_JS,
        );
        info!(
            "Rendered page ({} bytes) in {}ms",
            page.len(),
            start_time.elapsed().as_millis()
        );
        page
    }
}

fn render_map_frame(map: &MapArtifact) -> String {
    format!(
        r#"<div class="row" style="text-align: center;"><div class="col"><iframe id="map" width="{MAP_FRAME_WIDTH}" height="{MAP_FRAME_HEIGHT}" srcdoc="{}"></iframe></div></div>"#,
        html_escape(map.html())
    )
}

fn render_relationships() -> String {
    let mut out = format!(
        r#"<h4 class="mb-2" style="margin-top: 1em; padding: 10px 10px; text-align: center;">{}</h4>"#,
        html_escape(content::RELATIONSHIPS_HEADING)
    );
    for paragraph in content::RELATIONSHIPS {
        let _ = write!(out, r#"<p class="mb-2">{}</p>"#, html_escape(paragraph));
    }
    out
}

fn render_references() -> String {
    let mut out = format!(
        r#"<h4 class="mb-2" style="margin-top: 1em; padding: 10px 10px; text-align: center;">{}</h4>"#,
        html_escape(content::REFERENCES_HEADING)
    );
    for (publisher, links) in content::REFERENCES {
        let _ = write!(
            out,
            "<p class=\"mb-1\"><strong>{}</strong></p><ul>",
            html_escape(publisher)
        );
        for link in links.iter() {
            let _ = write!(out, "<li><cite>{}</cite></li>", html_escape(link));
        }
        out.push_str("</ul>");
    }
    out
}

fn render_table(table: &RecordTable, rules: &RuleSet) -> String {
    let columns = table.columns();
    let mut out = String::from(
        r#"<div class="records-wrapper"><table id="records" class="table table-sm table-bordered records"><thead><tr>"#,
    );
    for (idx, column) in columns.iter().enumerate() {
        let title = rules
            .thresholds_for(&column.name)
            .map(|t| format!(r#" title="10th percentile {}, median {}""#, t.p10, t.p50))
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<th{}{title} onclick="sortRecords({idx}, {})">{}</th>"#,
            fixed_class(idx),
            column.is_numeric(),
            html_escape(&column.name)
        );
    }
    out.push_str("</tr></thead><tbody>");

    for row in 0..table.height() {
        out.push_str("<tr>");
        for (idx, column) in columns.iter().enumerate() {
            let style = cell_style(column, row, rules)
                .map(|css| format!(r#" style="{css}""#))
                .unwrap_or_default();
            let _ = write!(
                out,
                "<td{}{style}>{}</td>",
                fixed_class(idx),
                html_escape(&column.data[row])
            );
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></div>");
    out
}

fn fixed_class(idx: usize) -> &'static str {
    if idx == 0 { r#" class="fixed""# } else { "" }
}

fn cell_style(column: &TableColumn, row: usize, rules: &RuleSet) -> Option<String> {
    let value = column.values.as_ref()?.get(row).copied().flatten();
    rules.resolve(&column.name, value).map(|r| r.css())
}

pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
