use twilight_model::channel::message::embed::{Embed, EmbedField};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_54_30;

/// Color and footer applied to every embed the bot produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedStyle {
    pub color: u32,
    pub footer: Option<String>,
}

impl Default for EmbedStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_EMBED_COLOR,
            footer: None,
        }
    }
}

impl EmbedStyle {
    /// A builder with the configured color and footer already applied.
    pub fn builder(&self) -> EmbedBuilder {
        let builder = EmbedBuilder::new().color(self.color);
        match self.footer.as_deref() {
            Some(footer) if !footer.is_empty() => {
                builder.footer(EmbedFooterBuilder::new(footer).build())
            }
            _ => builder,
        }
    }

    /// Title plus optional description.
    pub fn simple(&self, title: &str, description: Option<&str>) -> anyhow::Result<Embed> {
        let builder = self.builder().title(title);
        let builder = match description {
            Some(description) if !description.is_empty() => builder.description(description),
            _ => builder,
        };

        Ok(builder.validate()?.build())
    }

    /// Embed whose footer carries a note (e.g. the reply timeout) after the
    /// configured footer text.
    pub fn with_note(&self, title: &str, description: &str, note: &str) -> anyhow::Result<Embed> {
        let footer_text = match self.footer.as_deref() {
            Some(footer) if !footer.is_empty() => format!("{footer} • {note}"),
            _ => note.to_owned(),
        };

        let embed = EmbedBuilder::new()
            .color(self.color)
            .title(title)
            .description(description)
            .footer(EmbedFooterBuilder::new(footer_text).build())
            .validate()?
            .build();

        Ok(embed)
    }
}

/// Build a standard paginated embed with consistent styling.
///
/// `page` is zero-based; the footer shows it one-based, and only when there
/// is more than one page.
pub fn build_paginated_embed(
    style: &EmbedStyle,
    title: &str,
    description: impl Into<String>,
    page: usize,
    total_pages: usize,
    fields: &[EmbedField],
) -> anyhow::Result<Embed> {
    let total_pages = total_pages.max(1);
    let page = page.min(total_pages - 1) + 1;

    let page_text = (total_pages > 1).then(|| format!("Page {page}/{total_pages}"));
    let note = style.footer.as_deref().filter(|note| !note.is_empty());
    let footer_text = match (note, page_text) {
        (Some(note), Some(page_text)) => Some(format!("{note} • {page_text}")),
        (Some(note), None) => Some(note.to_owned()),
        (None, page_text) => page_text,
    };

    let mut builder = EmbedBuilder::new()
        .title(title)
        .color(style.color)
        .description(description);
    if let Some(footer_text) = footer_text {
        builder = builder.footer(EmbedFooterBuilder::new(footer_text).build());
    }

    for field in fields {
        builder = builder.field(field.clone());
    }

    Ok(builder.validate()?.build())
}

/// Shorthand for a plain embed field.
pub fn field(name: impl Into<String>, value: impl Into<String>, inline: bool) -> EmbedField {
    EmbedField {
        inline,
        name: name.into(),
        value: value.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated_footer_is_one_based() {
        let embed =
            build_paginated_embed(&EmbedStyle::default(), "Roles", "body", 0, 3, &[]).unwrap();
        assert_eq!(embed.footer.unwrap().text, "Page 1/3");
    }

    #[test]
    fn paginated_footer_keeps_configured_text() {
        let style = EmbedStyle {
            color: 1,
            footer: Some("Steward".to_owned()),
        };
        let embed = build_paginated_embed(&style, "Roles", "body", 9, 2, &[]).unwrap();
        assert_eq!(embed.footer.unwrap().text, "Steward • Page 2/2");
        assert_eq!(embed.color, Some(1));
    }

    #[test]
    fn single_page_has_no_page_counter() {
        let embed =
            build_paginated_embed(&EmbedStyle::default(), "Roles", "body", 0, 1, &[]).unwrap();
        assert!(embed.footer.is_none());

        let style = EmbedStyle {
            color: 1,
            footer: Some("Steward".to_owned()),
        };
        let embed = build_paginated_embed(&style, "Roles", "body", 0, 0, &[]).unwrap();
        assert_eq!(embed.footer.unwrap().text, "Steward");
    }

    #[test]
    fn simple_skips_empty_description() {
        let embed = EmbedStyle::default().simple("Title", Some("")).unwrap();
        assert!(embed.description.is_none());
        assert_eq!(embed.color, Some(DEFAULT_EMBED_COLOR));
    }
}
