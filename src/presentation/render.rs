use crate::application::dashboard::DashboardView;
use crate::domain::model::{Item, Query, User};
use crate::infrastructure::storage::cache::{EntryStatus, ResourceState};
use crate::presentation::theme::Theme;
use chrono::DateTime;
use std::fmt::Write;

/// Render options shared by every section.
pub struct RenderOptions<'a> {
    pub theme: &'a Theme,
    pub enable_emoji: bool,
}

/// Format the whole dashboard as terminal text
pub fn format_dashboard(view: &DashboardView, opts: &RenderOptions<'_>) -> String {
    let mut output = String::new();
    output.push_str(&format_user(&view.user, opts));
    output.push_str(&format_listing("Public Items", &view.listing, &view.query, opts));
    if view.user_items.status != EntryStatus::Idle {
        output.push_str(&format_listing("My Items", &view.user_items, &view.query, opts));
    }

    let theme = opts.theme;
    let prev = if view.can_go_previous { "[prev]" } else { "[prev: disabled]" };
    writeln!(output, "  {} [next]", (theme.meta)(prev)).ok();
    writeln!(output, "  {} {}", (theme.meta)("Link:"), (theme.link)(view.url.as_str())).ok();
    if view.staged != view.query {
        writeln!(
            output,
            "  {}",
            (theme.meta)(&format!(
                "Staged: page {} / per page {} / query \"{}\" (not searched yet)",
                view.staged.page, view.staged.per_page, view.staged.filter
            ))
        )
        .ok();
    }
    writeln!(output).ok();
    output
}

pub fn format_user(state: &ResourceState<User>, opts: &RenderOptions<'_>) -> String {
    let theme = opts.theme;
    let mut output = String::new();
    let icon = if opts.enable_emoji { "👤 " } else { "" };
    writeln!(output, "{}{}", icon, (theme.heading)("Authenticated User")).ok();

    if state.is_loading {
        writeln!(output, "  {}", (theme.meta)("Loading Qiita user...")).ok();
    }
    if let Some(error) = &state.error {
        writeln!(output, "  {}", (theme.error)(&format!("Error: {}", error))).ok();
    }
    if let Some(user) = &state.value {
        let name = if user.name.is_empty() { &user.id } else { &user.name };
        writeln!(output, "  {} (@{})", (theme.author)(name), user.id).ok();
        if let Some(description) = user.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(output, "  {}", (theme.body)(description)).ok();
        }
        writeln!(
            output,
            "  {}",
            (theme.meta)(&format!(
                "Followers: {} | Items: {}",
                user.followers_count, user.items_count
            ))
        )
        .ok();
    }
    writeln!(output).ok();
    output
}

pub fn format_listing(
    heading: &str,
    state: &ResourceState<Vec<Item>>,
    query: &Query,
    opts: &RenderOptions<'_>,
) -> String {
    let theme = opts.theme;
    let mut output = String::new();
    let icon = if opts.enable_emoji { "📚 " } else { "" };
    writeln!(output, "{}{}", icon, (theme.heading)(heading)).ok();

    if state.is_loading {
        writeln!(output, "  {}", (theme.meta)("Loading items...")).ok();
    }
    if let Some(error) = &state.error {
        writeln!(output, "  {}", (theme.error)(&format!("Error: {}", error))).ok();
    }
    match state.value.as_deref() {
        Some(items) if !items.is_empty() => {
            writeln!(
                output,
                "  {}",
                (theme.meta)(&format!(
                    "Showing {} items (Page {})",
                    items.len(),
                    query.page
                ))
            )
            .ok();
            let cutoff = "⸺".repeat(40);
            writeln!(output, "  {}", (theme.rule)(&cutoff)).ok();
            for (i, item) in items.iter().enumerate() {
                writeln!(
                    output,
                    "  {}. {}",
                    (theme.index)(&(i + 1).to_string()),
                    (theme.title)(&item.title)
                )
                .ok();
                writeln!(output, "     {}", (theme.link)(&item.url)).ok();
                writeln!(
                    output,
                    "     {} {}",
                    (theme.likes)(&format!("Likes: {}", item.likes_count)),
                    (theme.meta)(&format!("| Created: {}", created_date(&item.created_at)))
                )
                .ok();
            }
        }
        Some(_) => {
            writeln!(output, "  {}", (theme.meta)("No items found")).ok();
        }
        None => {}
    }
    writeln!(output).ok();
    output
}

/// `YYYY-MM-DD` from an ISO-8601 timestamp; unparsable input is shown as is.
pub fn created_date(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}
