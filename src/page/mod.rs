//! Dashboard Page Model
//!
//! Headless stand-in for the dashboard markup. Elements are addressed by
//! fixed ids; every write targets one element and silently does nothing
//! when the element is absent (or of another kind).
//!
//! ## Element kinds
//!
//! - **Canvas**: hosts a chart (charts live in [`ChartRegistry`])
//! - **Table**: preview table container
//! - **Anchor**: CSV download link
//! - **Text**: plain text, used for the "last updated" stamp

mod chart;
mod html;
mod table;

pub use chart::{Chart, ChartRegistry, ChartStyle, LINE_TENSION};
pub use html::render_html;
pub use table::PreviewTable;

use serde::Serialize;
use std::collections::HashMap;

use crate::indicators::{INDICATORS, LAST_UPDATED_ID};
use crate::series::Row;

/// A page element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Canvas,
    Table { content: Option<PreviewTable> },
    Anchor { href: Option<String> },
    Text { content: String },
}

/// Elements keyed by id, in layout order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    elements: HashMap<String, Element>,
    order: Vec<String>,
}

impl Page {
    /// Create an empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard dashboard layout with every indicator's elements
    pub fn dashboard() -> Self {
        let mut page = Self::new().with_text(LAST_UPDATED_ID);

        for spec in INDICATORS {
            page = page.with_canvas(spec.chart_id).with_anchor(spec.download_id);
            for table_id in spec.table_ids {
                page = page.with_table(table_id);
            }
        }

        page
    }

    pub fn with_canvas(mut self, id: &str) -> Self {
        self.insert(id, Element::Canvas);
        self
    }

    pub fn with_table(mut self, id: &str) -> Self {
        self.insert(id, Element::Table { content: None });
        self
    }

    pub fn with_anchor(mut self, id: &str) -> Self {
        self.insert(id, Element::Anchor { href: None });
        self
    }

    pub fn with_text(mut self, id: &str) -> Self {
        self.insert(
            id,
            Element::Text {
                content: String::new(),
            },
        );
        self
    }

    /// Add or replace an element
    pub fn insert(&mut self, id: &str, element: Element) {
        if self.elements.insert(id.to_string(), element).is_none() {
            self.order.push(id.to_string());
        }
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Elements in layout order
    pub fn elements(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.order
            .iter()
            .filter_map(|id| self.elements.get(id).map(|el| (id.as_str(), el)))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn has_canvas(&self, id: &str) -> bool {
        matches!(self.elements.get(id), Some(Element::Canvas))
    }

    /// Replace a table's content with a capped preview of `rows`.
    ///
    /// Returns `false` if there is no table with this id.
    pub fn render_table<H: AsRef<str>>(
        &mut self,
        id: &str,
        headers: &[H],
        rows: &[Row],
        max_rows: usize,
    ) -> bool {
        match self.elements.get_mut(id) {
            Some(Element::Table { content }) => {
                *content = Some(PreviewTable::build(headers, rows, max_rows));
                true
            }
            _ => false,
        }
    }

    /// Point a download anchor at a new target
    pub fn set_href(&mut self, id: &str, target: String) -> bool {
        match self.elements.get_mut(id) {
            Some(Element::Anchor { href }) => {
                *href = Some(target);
                true
            }
            _ => false,
        }
    }

    /// Replace a text element's content
    pub fn set_text(&mut self, id: &str, text: String) -> bool {
        match self.elements.get_mut(id) {
            Some(Element::Text { content }) => {
                *content = text;
                true
            }
            _ => false,
        }
    }

    pub fn table(&self, id: &str) -> Option<&PreviewTable> {
        match self.elements.get(id) {
            Some(Element::Table { content }) => content.as_ref(),
            _ => None,
        }
    }

    pub fn href(&self, id: &str) -> Option<&str> {
        match self.elements.get(id) {
            Some(Element::Anchor { href }) => href.as_deref(),
            _ => None,
        }
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        match self.elements.get(id) {
            Some(Element::Text { content }) => Some(content.as_str()),
            _ => None,
        }
    }
}
