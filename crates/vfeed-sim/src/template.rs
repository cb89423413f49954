#![forbid(unsafe_code)]

//! HTML markup for feed entries and an in-memory element that the window
//! engine recycles.

use std::fmt::Write as _;

use vfeed_core::ItemRenderer;

use crate::item::FeedItem;

fn html_escape(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

fn write_section(out: &mut String, src: &str, heading: &str, text: &str, top: Option<f64>) {
    match top {
        Some(top) => {
            let _ = write!(
                out,
                "<section class=\"feed__item\" style=\"transform: translateY({top}px)\">"
            );
        }
        None => out.push_str("<section class=\"feed__item\">"),
    }
    let _ = write!(
        out,
        "<img class=\"feed__item__img\" alt=\"Avatar for logo\" src=\"{}\"/>\
         <div class=\"feed__item__description\">\
         <h2 class=\"h2-header\">{}</h2>\
         <p class=\"p-text\">{}</p>\
         </div></section>",
        html_escape(src),
        html_escape(heading),
        html_escape(text)
    );
}

/// Markup for one entry: exactly one top-level `<section>`.
#[must_use]
pub fn template(item: &FeedItem) -> String {
    let mut out = String::new();
    write_section(&mut out, &item.url, &item.name, &item.description, None);
    out
}

/// A rendered entry whose text nodes are rewritten in place on reuse.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    src: String,
    heading: String,
    text: String,
    top: Option<f64>,
    rewrites: u32,
}

impl HtmlElement {
    #[must_use]
    pub fn new(item: &FeedItem) -> Self {
        Self {
            src: item.url.clone(),
            heading: item.name.clone(),
            text: item.description.clone(),
            top: None,
            rewrites: 0,
        }
    }

    /// Rewrite the avatar, heading, and body for a different entry.
    pub fn update(&mut self, item: &FeedItem) {
        self.src.clone_from(&item.url);
        self.heading.clone_from(&item.name);
        self.text.clone_from(&item.description);
        self.rewrites += 1;
    }

    pub fn set_top(&mut self, top: f64) {
        self.top = Some(top);
    }

    #[must_use]
    pub fn top(&self) -> Option<f64> {
        self.top
    }

    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// How many times this element has been reused.
    #[must_use]
    pub fn rewrites(&self) -> u32 {
        self.rewrites
    }

    #[must_use]
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_section(&mut out, &self.src, &self.heading, &self.text, self.top);
        out
    }
}

/// Height model for the simulated layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Avatar row plus heading, in px.
    pub base: f64,
    /// Height of one line of body text, in px.
    pub line_height: f64,
    /// Characters that fit on one body line.
    pub chars_per_line: usize,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            base: 64.0,
            line_height: 20.0,
            chars_per_line: 48,
        }
    }
}

/// Renders [`FeedItem`]s into [`HtmlElement`]s.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    metrics: TextMetrics,
    created: usize,
    updated: usize,
}

impl HtmlRenderer {
    #[must_use]
    pub fn new(metrics: TextMetrics) -> Self {
        Self {
            metrics,
            created: 0,
            updated: 0,
        }
    }

    #[must_use]
    pub fn created(&self) -> usize {
        self.created
    }

    #[must_use]
    pub fn updated(&self) -> usize {
        self.updated
    }

    #[must_use]
    pub fn height_of(&self, text: &str) -> f64 {
        let per_line = self.metrics.chars_per_line.max(1);
        let lines = text.chars().count().div_ceil(per_line).max(1);
        self.metrics.base + lines as f64 * self.metrics.line_height
    }
}

impl ItemRenderer<FeedItem> for HtmlRenderer {
    type Element = HtmlElement;

    fn create(&mut self, item: &FeedItem) -> HtmlElement {
        self.created += 1;
        HtmlElement::new(item)
    }

    fn update(&mut self, element: &mut HtmlElement, item: &FeedItem) {
        self.updated += 1;
        element.update(item);
    }

    fn measure(&self, element: &HtmlElement) -> f64 {
        self.height_of(element.text())
    }

    fn place(&mut self, element: &mut HtmlElement, offset_y: f64) {
        element.set_top(offset_y);
    }
}
