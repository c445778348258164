//! Plain-text rendering of the dashboard for terminal output.

use dishboard_client::ConnectionState;
use dishboard_protocol::Dish;

/// One line per dish: publish marker, id, name and image URL.
pub fn render_dishes(dishes: &[Dish]) -> String {
    if dishes.is_empty() {
        return "(no dishes)".to_string();
    }
    let id_width = dishes.iter().map(|d| d.dish_id.len()).max().unwrap_or(0);
    let name_width = dishes.iter().map(|d| d.dish_name.len()).max().unwrap_or(0);
    dishes
        .iter()
        .map(|dish| {
            let marker = if dish.is_published { "[x]" } else { "[ ]" };
            format!(
                "{marker} {:id_width$}  {:name_width$}  {}",
                dish.dish_id, dish.dish_name, dish.image_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_state(state: ConnectionState) -> String {
    match state {
        ConnectionState::Connecting => "connecting".to_string(),
        ConnectionState::Connected => "live".to_string(),
        ConnectionState::Reconnecting { attempt } => format!("reconnecting (attempt {attempt})"),
        ConnectionState::Disconnected => "disconnected".to_string(),
    }
}
