//! HTML rendering of the dashboard page.
//!
//! The output is a single document: tables and links are plain markup,
//! charts are canvases whose Chart.js configs are embedded as JSON and
//! instantiated by a short inline script.

use serde_json::{Map, Value};
use std::fmt::Write;

use super::{ChartRegistry, Element, Page};

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;color:#222}\
section{margin-bottom:2rem}\
canvas{max-width:900px;max-height:320px}\
.preview-table{border-collapse:collapse;font-size:.85rem}\
.preview-table th,.preview-table td{border:1px solid #ddd;padding:2px 8px}\
.preview-note{color:#666;font-size:.8rem;margin:.25rem 0}";

const BOOT_SCRIPT: &str = "(function(){\
var cfg=JSON.parse(document.getElementById('chart-configs').textContent);\
Object.keys(cfg).forEach(function(id){\
var el=document.getElementById(id);\
if(el&&window.Chart){new Chart(el.getContext('2d'),cfg[id]);}\
});\
})();";

/// Render the page and its charts as a standalone HTML document
pub fn render_html(page: &Page, charts: &ChartRegistry) -> String {
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Painel de Indicadores</title>\n");
    let _ = writeln!(out, "<style>{}</style>", STYLE);
    let _ = writeln!(out, "<script src=\"{}\"></script>", CHART_JS_CDN);
    out.push_str("</head>\n<body>\n<h1>Painel de Indicadores</h1>\n");

    for (id, element) in page.elements() {
        render_element(&mut out, id, element);
    }

    let mut configs = Map::new();
    for chart in charts.iter() {
        if page.has_canvas(&chart.id) {
            configs.insert(chart.id.clone(), chart.config());
        }
    }
    let json = Value::Object(configs).to_string().replace("</", "<\\/");
    let _ = writeln!(
        out,
        "<script type=\"application/json\" id=\"chart-configs\">{}</script>",
        json
    );
    let _ = writeln!(out, "<script>{}</script>", BOOT_SCRIPT);

    out.push_str("</body>\n</html>\n");
    out
}

fn render_element(out: &mut String, id: &str, element: &Element) {
    let id_attr = escape(id);

    match element {
        Element::Canvas => {
            let _ = writeln!(out, "<section><canvas id=\"{}\"></canvas></section>", id_attr);
        }
        Element::Table { content } => {
            let _ = write!(out, "<div id=\"{}\" class=\"preview\">", id_attr);
            if let Some(table) = content {
                let _ = write!(out, "<div class=\"preview-note\">{}</div>", escape(&table.note()));
                out.push_str("<table class=\"preview-table\"><thead><tr>");
                for header in &table.headers {
                    let _ = write!(out, "<th>{}</th>", escape(header));
                }
                out.push_str("</tr></thead><tbody>");
                for row in &table.rows {
                    out.push_str("<tr>");
                    for cell in row {
                        let _ = write!(out, "<td>{}</td>", escape(cell));
                    }
                    out.push_str("</tr>");
                }
                out.push_str("</tbody></table>");
            }
            out.push_str("</div>\n");
        }
        Element::Anchor { href } => {
            let filename = id.strip_prefix("download-").unwrap_or(id);
            let _ = writeln!(
                out,
                "<p><a id=\"{}\" href=\"{}\" download=\"{}.csv\">Baixar CSV</a></p>",
                id_attr,
                escape(href.as_deref().unwrap_or("#")),
                escape(filename)
            );
        }
        Element::Text { content } => {
            let _ = writeln!(
                out,
                "<p>Atualizado em: <span id=\"{}\">{}</span></p>",
                id_attr,
                escape(content)
            );
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
