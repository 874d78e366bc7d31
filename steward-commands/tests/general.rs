mod common;

use common::{BOT, CHANNEL, Harness};
use steward_commands::handle_message;

#[tokio::test]
async fn help_lists_every_category_on_first_page() {
    let h = Harness::new();
    let command = h.message("!help");
    let menu = h.upcoming(CHANNEL, 0);

    handle_message(h.ctx.clone(), command).await.unwrap();

    let sent = h.transport.sent();
    assert_eq!(sent[0].0, menu);
    let embed = &sent[0].1.embeds[0];
    assert_eq!(embed.title.as_deref(), Some("Available Commands"));
    let names: Vec<&str> = embed.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(names, ["General", "Messages", "Roles"]);
    // Menu times out without input
    assert!(h.transport.was_deleted(menu));
}

#[tokio::test]
async fn help_shows_sub_command_detail() {
    let h = Harness::new();
    let command = h.message("!help rr create");

    handle_message(h.ctx.clone(), command).await.unwrap();

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    let embed = &sent[0].1.embeds[0];
    assert_eq!(embed.title.as_deref(), Some("!rr create"));
    assert!(embed.fields.iter().any(|field| field.name == "Usage"));
}

#[tokio::test]
async fn help_rejects_unknown_topic() {
    let h = Harness::new();
    let command = h.message("!help weather");

    handle_message(h.ctx.clone(), command).await.unwrap();

    let sent = h.transport.sent();
    assert_eq!(sent[0].1.embeds[0].title.as_deref(), Some("Unknown Help Topic"));
}

#[tokio::test]
async fn ping_edits_in_latency() {
    let h = Harness::new();
    let command = h.message("!ping");

    handle_message(h.ctx.clone(), command).await.unwrap();

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.content.as_deref(), Some("Pong!"));
    let edited = h.transport.latest_payload(sent[0].0).unwrap();
    assert!(edited.content.unwrap_or_default().starts_with("Pong! `"));
}

#[tokio::test]
async fn bots_and_plain_chat_are_ignored() {
    let h = Harness::new();

    let mut from_bot = h.message("!ping");
    from_bot.author_bot = true;
    handle_message(h.ctx.clone(), from_bot).await.unwrap();

    let own = h.transport.user_message(Some(common::GUILD), CHANNEL, BOT, "!ping");
    handle_message(h.ctx.clone(), own).await.unwrap();

    let chatter = h.message("ping everyone");
    handle_message(h.ctx.clone(), chatter).await.unwrap();

    let unknown = h.message("!dance");
    handle_message(h.ctx.clone(), unknown).await.unwrap();

    assert!(h.transport.sent().is_empty());
}
