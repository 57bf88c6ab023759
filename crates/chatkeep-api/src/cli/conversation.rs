//! Conversation CLI commands: list, show, delete.
//!
//! These operate on the same store the server uses, so they are best run
//! while the server is stopped.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use chatkeep_types::chat::{ConversationRecord, MessageRole};

use crate::state::AppState;

pub async fn list_conversations(state: &AppState, json: bool) -> Result<()> {
    let conversations = state.chat_gateway.list_conversations().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!();
        println!(
            "  {} No conversations stored yet. Start one with: {}",
            style("i").blue().bold(),
            style("chatkeep serve").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Last Updated").fg(Color::White),
    ]);

    for conversation in &conversations {
        table.add_row(vec![
            Cell::new(conversation.id.as_str()).fg(Color::Cyan),
            Cell::new(truncate(display_title(conversation), 50)),
            Cell::new(conversation.messages.len()),
            Cell::new(format_relative_time(&conversation.last_updated)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} conversation{}",
        conversations.len(),
        if conversations.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

pub async fn show_conversation(state: &AppState, id: &str, json: bool) -> Result<()> {
    let conversation = state.chat_gateway.get_conversation(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(display_title(&conversation)).cyan().bold());
    println!(
        "  {}",
        style(format!(
            "{} · {} messages · updated {}",
            conversation.id,
            conversation.messages.len(),
            conversation.last_updated.format("%Y-%m-%d %H:%M UTC")
        ))
        .dim()
    );
    println!();

    for message in &conversation.messages {
        let label = match message.role {
            MessageRole::User => style("You").green().bold(),
            MessageRole::Assistant => style("Assistant").magenta().bold(),
        };
        println!("  {label}");
        for line in message.content.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

pub async fn delete_conversation(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete conversation '{}'?",
                style(id).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_gateway.delete_conversation(id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": true, "id": id }));
    } else {
        println!("  {} Conversation '{}' deleted.", style("✓").red().bold(), id);
    }

    Ok(())
}

fn display_title(conversation: &ConversationRecord) -> &str {
    match conversation.title.as_deref() {
        Some(title) if !title.trim().is_empty() => title,
        _ => "(untitled)",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let diff = chrono::Utc::now() - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 50), "short");
        let hebrew = "שלום".repeat(20);
        let cut = truncate(&hebrew, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn relative_time_buckets() {
        let now = chrono::Utc::now();
        assert_eq!(format_relative_time(&now), "just now");
        assert_eq!(format_relative_time(&(now - chrono::Duration::hours(3))), "3h ago");
        let old = "2020-05-01T00:00:00Z".parse().unwrap();
        assert_eq!(format_relative_time(&old), "2020-05-01");
    }
}
