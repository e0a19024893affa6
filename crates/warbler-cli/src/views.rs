use tracing::warn;

use warbler_db::{LikeRow, MessageRow, UserRow, UserStats};
use warbler_types::api::UserCounts;
use warbler_types::models::{Like, Message, User, parse_timestamp};

pub fn user(row: &UserRow) -> User {
    User {
        id: row.id,
        username: row.username.clone(),
        email: row.email.clone(),
        image_url: row.image_url.clone(),
        header_image_url: row.header_image_url.clone(),
        bio: row.bio.clone(),
        location: row.location.clone(),
    }
}

pub fn users(rows: &[UserRow]) -> Vec<User> {
    rows.iter().map(user).collect()
}

pub fn message(row: &MessageRow) -> Message {
    let timestamp = parse_timestamp(&row.timestamp).unwrap_or_else(|| {
        warn!("Corrupt timestamp '{}' on message {}", row.timestamp, row.id);
        chrono::DateTime::default()
    });

    Message {
        id: row.id,
        text: row.text.clone(),
        user_id: row.user_id,
        timestamp,
    }
}

pub fn messages(rows: &[MessageRow]) -> Vec<Message> {
    rows.iter().map(message).collect()
}

pub fn like(row: &LikeRow) -> Like {
    Like {
        id: row.id,
        user_id: row.user_id,
        message_id: row.message_id,
    }
}

pub fn counts(stats: UserStats) -> UserCounts {
    UserCounts {
        messages: stats.messages,
        following: stats.following,
        followers: stats.followers,
        likes: stats.likes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        let row = MessageRow {
            id: 7,
            text: "a warble".into(),
            timestamp: "not a time".into(),
            user_id: 1,
        };
        let view = message(&row);
        assert_eq!(view.timestamp.timestamp(), 0);
        assert_eq!(view.text, "a warble");
    }
}
