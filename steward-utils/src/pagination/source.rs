//! Page sources: fixed lists sliced into pages and rendered as embeds.

use twilight_model::channel::message::embed::{Embed, EmbedField};

use super::{
    glyph::NUMBER_GLYPHS,
    page::{clamp_page, effective_page_size, page_window, total_pages},
};
use crate::embed::{EmbedStyle, build_paginated_embed};

/// Supplies the pages shown by a [`ReactionMenu`](super::menu::ReactionMenu).
pub trait PageSource: Send + Sync {
    fn per_page(&self) -> usize;

    fn entry_count(&self) -> usize;

    fn page_count(&self) -> usize {
        total_pages(self.entry_count(), self.per_page())
    }

    /// Entries on a given page, 0 for out-of-range pages.
    fn entries_on(&self, page: usize) -> usize {
        let (start, end) = page_window(self.entry_count(), self.per_page(), page);
        end - start
    }

    /// Whether number glyphs select entries.
    fn is_selector(&self) -> bool {
        false
    }

    fn render(&self, page: usize) -> anyhow::Result<Embed>;
}

/// One line per entry; selector sources prefix each line with its number glyph.
pub struct ListPageSource {
    style: EmbedStyle,
    title: String,
    description: Option<String>,
    entries: Vec<String>,
    fields: Vec<EmbedField>,
    per_page: usize,
    selector: bool,
}

impl ListPageSource {
    pub fn new(style: EmbedStyle, title: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            style,
            title: title.into(),
            description: None,
            entries,
            fields: Vec::new(),
            per_page: effective_page_size(usize::MAX),
            selector: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = effective_page_size(per_page);
        self
    }

    pub fn selector(mut self, selector: bool) -> Self {
        self.selector = selector;
        self
    }

    /// Fields repeated on every page (e.g. selection context).
    pub fn fields(mut self, fields: Vec<EmbedField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    fn render_lines(&self, page: usize) -> String {
        let (start, end) = page_window(self.entries.len(), self.per_page, page);

        self.entries[start..end]
            .iter()
            .enumerate()
            .map(|(slot, entry)| {
                if self.selector {
                    format!("{} {entry}", NUMBER_GLYPHS[slot])
                } else {
                    format!("- {entry}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PageSource for ListPageSource {
    fn per_page(&self) -> usize {
        self.per_page
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn is_selector(&self) -> bool {
        self.selector
    }

    fn render(&self, page: usize) -> anyhow::Result<Embed> {
        let total = self.page_count();
        let page = clamp_page(page, total);
        let lines = self.render_lines(page);

        let description = match (self.description.as_deref(), lines.is_empty()) {
            (Some(header), true) => header.to_owned(),
            (Some(header), false) => format!("{header}\n\n{lines}"),
            (None, true) => "Nothing to show.".to_owned(),
            (None, false) => lines,
        };

        build_paginated_embed(
            &self.style,
            &self.title,
            description,
            page,
            total,
            &self.fields,
        )
    }
}

/// Pages made of embed fields, e.g. the fields of a stored record.
pub struct FieldPageSource {
    style: EmbedStyle,
    title: String,
    description: String,
    fields: Vec<EmbedField>,
    per_page: usize,
}

impl FieldPageSource {
    pub fn new(
        style: EmbedStyle,
        title: impl Into<String>,
        description: impl Into<String>,
        fields: Vec<EmbedField>,
        per_page: usize,
    ) -> Self {
        Self {
            style,
            title: title.into(),
            description: description.into(),
            fields,
            per_page: effective_page_size(per_page),
        }
    }
}

impl PageSource for FieldPageSource {
    fn per_page(&self) -> usize {
        self.per_page
    }

    fn entry_count(&self) -> usize {
        self.fields.len()
    }

    fn render(&self, page: usize) -> anyhow::Result<Embed> {
        let total = self.page_count();
        let page = clamp_page(page, total);
        let (start, end) = page_window(self.fields.len(), self.per_page, page);

        build_paginated_embed(
            &self.style,
            &self.title,
            self.description.clone(),
            page,
            total,
            &self.fields[start..end],
        )
    }
}
