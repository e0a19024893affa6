use crate::migrations::DEFAULT_IMAGE_URL;
use crate::models::{FollowRow, LikeRow, MessageRow, NewUser, ProfileUpdate, UserRow, UserStats};
use crate::{Database, DbError, Result};
use rusqlite::{Connection, Row};
use tracing::debug;

const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.image_url, u.header_image_url, u.bio, u.location, u.password";

const MESSAGE_COLUMNS: &str = "m.id, m.text, m.timestamp, m.user_id";

pub const DEFAULT_FEED_LIMIT: u32 = 100;

impl Database {
    // -- Users --

    /// Insert a user whose password is already hashed.
    pub fn insert_user(&self, user: &NewUser) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password, image_url)
                 VALUES (?1, ?2, ?3, COALESCE(?4, ?5))",
                rusqlite::params![
                    user.username,
                    user.email,
                    user.password,
                    user.image_url,
                    DEFAULT_IMAGE_URL
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("user {id}")))
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u ORDER BY u.id");
            query_users(conn, &sql, [])
        })
    }

    /// Users whose username contains `query`, ignoring case.
    pub fn search_users(&self, query: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE instr(lower(u.username), lower(?1)) > 0
                 ORDER BY u.id"
            );
            query_users(conn, &sql, [query])
        })
    }

    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    username = COALESCE(?2, username),
                    email = COALESCE(?3, email),
                    image_url = COALESCE(?4, image_url),
                    header_image_url = COALESCE(?5, header_image_url),
                    bio = COALESCE(?6, bio),
                    location = COALESCE(?7, location)
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    update.username,
                    update.email,
                    update.image_url,
                    update.header_image_url,
                    update.bio,
                    update.location
                ],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("user {id}")));
            }
            debug!("Updated profile of user {}", id);
            query_user_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("user {id}")))
        })
    }

    /// Delete a user together with their messages, follow edges and likes.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            debug!("Deleted user {} ({} rows)", id, deleted);
            Ok(deleted > 0)
        })
    }

    pub fn user_stats(&self, id: i64) -> Result<UserStats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE follower_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE followed_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
                [id],
                |row| {
                    Ok(UserStats {
                        messages: row.get(0)?,
                        following: row.get(1)?,
                        followers: row.get(2)?,
                        likes: row.get(3)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }

    // -- Messages --

    pub fn create_message(&self, user_id: i64, text: &str) -> Result<MessageRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (text, user_id) VALUES (?1, ?2)",
                rusqlite::params![text, user_id],
            )?;
            let id = conn.last_insert_rowid();
            debug!("User {} posted message {}", user_id, id);
            query_message_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("message {id}")))
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message_by_id(conn, id))
    }

    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    /// Messages authored by `user_id`, oldest first.
    pub fn get_messages_by_user(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.user_id = ?1 ORDER BY m.id"
            );
            query_messages(conn, &sql, rusqlite::params![user_id])
        })
    }

    /// Messages by `user_id` and everyone they follow, newest first.
    pub fn home_feed(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m
                 WHERE m.user_id = ?1
                    OR m.user_id IN (SELECT followed_id FROM follows WHERE follower_id = ?1)
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            query_messages(conn, &sql, rusqlite::params![user_id, limit])
        })
    }

    // -- Follows --

    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<FollowRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO follows (followed_id, follower_id) VALUES (?1, ?2)",
                [followed_id, follower_id],
            )?;
            debug!("User {} now follows {}", follower_id, followed_id);
            Ok(FollowRow {
                followed_id,
                follower_id,
            })
        })
    }

    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute(
                "DELETE FROM follows WHERE followed_id = ?1 AND follower_id = ?2",
                [followed_id, follower_id],
            )?;
            Ok(deleted > 0)
        })
    }

    /// Whether `user_id` follows `other_id`.
    pub fn is_following(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, user_id, other_id))
    }

    /// Whether `user_id` is followed by `other_id`.
    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, other_id, user_id))
    }

    /// Users that `user_id` follows, in the order they were followed.
    pub fn get_following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM follows f
                 JOIN users u ON u.id = f.followed_id
                 WHERE f.follower_id = ?1
                 ORDER BY f.rowid"
            );
            query_users(conn, &sql, [user_id])
        })
    }

    /// Users following `user_id`, in the order they started following.
    pub fn get_followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM follows f
                 JOIN users u ON u.id = f.follower_id
                 WHERE f.followed_id = ?1
                 ORDER BY f.rowid"
            );
            query_users(conn, &sql, [user_id])
        })
    }

    // -- Likes --

    pub fn like(&self, user_id: i64, message_id: i64) -> Result<LikeRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                [user_id, message_id],
            )?;
            Ok(LikeRow {
                id: conn.last_insert_rowid(),
                user_id,
                message_id,
            })
        })
    }

    /// Toggle a like: removes it if present, inserts it if not.
    /// Returns true when the message is liked afterwards.
    pub fn toggle_like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM likes WHERE user_id = ?1 AND message_id = ?2",
                    [user_id, message_id],
                    |row| row.get(0),
                )
                .optional()?;

            let liked = if let Some(like_id) = existing {
                tx.execute("DELETE FROM likes WHERE id = ?1", [like_id])?;
                false
            } else {
                tx.execute(
                    "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                    [user_id, message_id],
                )?;
                true
            };

            tx.commit()?;
            debug!("User {} like on message {}: {}", user_id, message_id, liked);
            Ok(liked)
        })
    }

    pub fn get_likes_by_user(&self, user_id: i64) -> Result<Vec<LikeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, message_id FROM likes WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(LikeRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        message_id: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Messages liked by `user_id`, in the order they were liked.
    pub fn get_liked_messages(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM likes l
                 JOIN messages m ON m.id = l.message_id
                 WHERE l.user_id = ?1
                 ORDER BY l.id"
            );
            query_messages(conn, &sql, rusqlite::params![user_id])
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        image_url: row.get(3)?,
        header_image_url: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        password: row.get(7)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
    })
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    conn.query_row(&sql, [id], user_from_row).optional()
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1");
    conn.query_row(&sql, [username], user_from_row).optional()
}

fn query_users<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_message_by_id(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.id = ?1");
    conn.query_row(&sql, [id], message_from_row).optional()
}

fn query_messages<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn edge_exists(conn: &Connection, follower_id: i64, followed_id: i64) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ?1 AND followed_id = ?2)",
        [follower_id, followed_id],
        |row| row.get(0),
    )?;
    Ok(found)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
