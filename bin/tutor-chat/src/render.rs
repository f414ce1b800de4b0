//! Plain-text rendering of transcript entries and notices.

use tutor_client::{Message, Notice, Role};

pub fn message_line(message: &Message) -> String {
    let who = match message.role() {
        Role::User => "you",
        Role::Assistant => "tutor",
    };
    format!(
        "[{}] {who}: {}",
        message.timestamp().format("%H:%M"),
        message.content()
    )
}

pub fn notice_line(notice: &Notice) -> String {
    format!("! {}: {}", notice.title, notice.description)
}
