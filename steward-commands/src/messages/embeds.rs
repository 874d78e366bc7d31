use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::{EmbedAuthorBuilder, ImageSource};

use steward_database::model::CustomMessage;
use steward_utils::{embed::{EmbedStyle, field}, prompt::Rejection, time::now_timestamp};

pub const TITLE_LIMIT: usize = 256;
pub const DESCRIPTION_LIMIT: usize = 4096;
pub const FIELD_NAME_LIMIT: usize = 256;
pub const FIELD_VALUE_LIMIT: usize = 1024;
pub const MAX_FIELDS: usize = 25;

/// Render a stored custom message as the embed members will see.
pub fn render_custom_message(style: &EmbedStyle, message: &CustomMessage) -> anyhow::Result<Embed> {
    let mut builder = style.builder().title(&message.title);

    if let Some(description) = &message.description {
        builder = builder.description(description);
    }
    if let Some(url) = &message.url {
        builder = builder.url(url);
    }
    if let Some(thumbnail) = &message.thumbnail {
        builder = builder.thumbnail(ImageSource::url(thumbnail)?);
    }
    if let Some(image) = &message.image {
        builder = builder.image(ImageSource::url(image)?);
    }
    if let Some(author) = &message.author {
        let mut author_builder = EmbedAuthorBuilder::new(&author.name);
        if let Some(icon_url) = &author.icon_url {
            author_builder = author_builder.icon_url(ImageSource::url(icon_url)?);
        }
        builder = builder.author(author_builder);
    }
    for message_field in &message.fields {
        builder = builder.field(field(
            &message_field.name,
            &message_field.value,
            message_field.inline,
        ));
    }

    Ok(builder.validate()?.build())
}

/// `<#a>, <#b>` for stored channel ids.
pub fn channel_list(channels: &[u64]) -> String {
    if channels.is_empty() {
        return "None".to_owned();
    }

    channels
        .iter()
        .map(|channel| format!("<#{channel}>"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Menu line for a stored message.
pub fn entry_line(message: &CustomMessage) -> String {
    format!("**{}** | {}", message.title, channel_list(&message.channels))
}

pub fn validate_length(raw: &str, limit: usize, what: &str) -> Result<String, Rejection> {
    let count = raw.chars().count();
    if count > limit {
        return Err(Rejection::invalid(format!(
            "The {what} can be at most {limit} characters long (yours has {count}). \
             Please __**send a shorter {what}**__:"
        )));
    }
    Ok(raw.to_owned())
}

/// Accept `http(s)` links without whitespace.
pub fn validate_link(raw: &str) -> Result<String, Rejection> {
    let raw = raw.trim();
    let has_scheme = raw.starts_with("https://") || raw.starts_with("http://");

    if !has_scheme || raw.contains(char::is_whitespace) {
        return Err(Rejection::invalid(
            "That is not a valid link. Links must start with `http://` or `https://`. \
             Please __**send a valid link**__ or enter \"skip\":",
        ));
    }
    Ok(raw.to_owned())
}

/// A link that Discord will also accept as an embed image.
pub fn validate_image(raw: &str) -> Result<String, Rejection> {
    let link = validate_link(raw)?;

    if ImageSource::url(&link).is_err() {
        return Err(Rejection::invalid(
            "I cannot use that link as an image. Please __**send a direct image link**__ \
             or enter \"skip\":",
        ));
    }
    Ok(link)
}

pub fn created_audit_entry(
    style: &EmbedStyle,
    message: &CustomMessage,
    author_id: u64,
) -> anyhow::Result<Embed> {
    Ok(style
        .builder()
        .title("Custom Embed Created")
        .description(format!(
            "<@{author_id}> has created a new custom embedded message."
        ))
        .field(field("Title", &message.title, false))
        .field(field("Channels", channel_list(&message.channels), false))
        .timestamp(now_timestamp()?)
        .validate()?
        .build())
}

pub fn sent_audit_entry(
    style: &EmbedStyle,
    message: &CustomMessage,
    author_id: u64,
    delivered: &[u64],
) -> anyhow::Result<Embed> {
    Ok(style
        .builder()
        .title("Custom Embed Sent")
        .description(format!(
            "<@{author_id}> has sent the custom embedded message **{}**.",
            message.title
        ))
        .field(field("Channels", channel_list(delivered), false))
        .timestamp(now_timestamp()?)
        .validate()?
        .build())
}

pub fn deleted_audit_entry(
    style: &EmbedStyle,
    message: &CustomMessage,
    author_id: u64,
) -> anyhow::Result<Embed> {
    Ok(style
        .builder()
        .title("Custom Embed Deleted")
        .description(format!(
            "<@{author_id}> has deleted the custom embedded message **{}**.",
            message.title
        ))
        .timestamp(now_timestamp()?)
        .validate()?
        .build())
}
