use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use tracing::info;

use warbler_db::{Database, ProfileUpdate, UserRow};
use warbler_types::api::{FeedResponse, FollowResponse, LoginResponse, ToggleLikeResponse, UserProfile};

use crate::config::{Command, Config};
use crate::views;

/// Run one subcommand against `db` and return its JSON output.
pub fn run(db: &Database, config: &Config, command: Command) -> Result<Value> {
    let output = match command {
        Command::Migrate => json!({ "status": "ok" }),

        Command::Reset => {
            db.reset()?;
            json!({ "status": "reset" })
        }

        Command::Signup {
            username,
            email,
            password,
            image_url,
        } => {
            let user = db.signup(
                Some(&username),
                Some(&email),
                password.as_deref(),
                image_url.as_deref(),
            )?;
            info!("Created user {} ({})", user.username, user.id);
            serde_json::to_value(views::user(&user))?
        }

        Command::Login { username, password } => {
            let user = db.authenticate(&username, &password)?;
            serde_json::to_value(LoginResponse {
                authenticated: user.is_some(),
                user: user.as_ref().map(views::user),
            })?
        }

        Command::Post { username, text } => {
            let author = require_user(db, &username)?;
            let message = db.create_message(author.id, &text)?;
            serde_json::to_value(views::message(&message))?
        }

        Command::DeleteMessage { id } => {
            let deleted = db.delete_message(id)?;
            json!({ "message_id": id, "deleted": deleted })
        }

        Command::Follow { username, target } => {
            let follower = require_user(db, &username)?;
            let followed = require_user(db, &target)?;
            db.follow(follower.id, followed.id)?;
            serde_json::to_value(FollowResponse {
                follower_id: follower.id,
                followed_id: followed.id,
                following: true,
            })?
        }

        Command::Unfollow { username, target } => {
            let follower = require_user(db, &username)?;
            let followed = require_user(db, &target)?;
            db.unfollow(follower.id, followed.id)?;
            serde_json::to_value(FollowResponse {
                follower_id: follower.id,
                followed_id: followed.id,
                following: false,
            })?
        }

        Command::Like {
            username,
            message_id,
        } => {
            let user = require_user(db, &username)?;
            let liked = db.toggle_like(user.id, message_id)?;
            serde_json::to_value(ToggleLikeResponse { message_id, liked })?
        }

        Command::Likes { username } => {
            let user = require_user(db, &username)?;
            let likes: Vec<_> = db.get_likes_by_user(user.id)?.iter().map(views::like).collect();
            serde_json::to_value(likes)?
        }

        Command::Feed { username } => {
            let user = require_user(db, &username)?;
            let rows = db.home_feed(user.id, config.feed_limit)?;
            serde_json::to_value(FeedResponse {
                user_id: user.id,
                messages: views::messages(&rows),
            })?
        }

        Command::Show { username } => {
            let user = require_user(db, &username)?;
            serde_json::to_value(UserProfile {
                counts: views::counts(db.user_stats(user.id)?),
                messages: views::messages(&db.get_messages_by_user(user.id)?),
                following: views::users(&db.get_following(user.id)?),
                followers: views::users(&db.get_followers(user.id)?),
                user: views::user(&user),
            })?
        }

        Command::Users { query } => {
            let rows = match query.as_deref() {
                Some(q) if !q.is_empty() => db.search_users(q)?,
                _ => db.list_users()?,
            };
            serde_json::to_value(views::users(&rows))?
        }

        Command::EditProfile {
            username,
            new_username,
            email,
            image_url,
            header_image_url,
            bio,
            location,
        } => {
            let user = require_user(db, &username)?;
            let updated = db.update_profile(
                user.id,
                &ProfileUpdate {
                    username: new_username,
                    email,
                    image_url,
                    header_image_url,
                    bio,
                    location,
                },
            )?;
            serde_json::to_value(views::user(&updated))?
        }

        Command::DeleteUser { username } => {
            let user = require_user(db, &username)?;
            let deleted = db.delete_user(user.id)?;
            info!("Deleted user {} ({})", user.username, user.id);
            json!({ "user_id": user.id, "deleted": deleted })
        }
    };

    Ok(output)
}

fn require_user(db: &Database, username: &str) -> Result<UserRow> {
    db.get_user_by_username(username)?
        .ok_or_else(|| anyhow!("no such user: {}", username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warbler_db::DbError;

    fn setup() -> (Database, Config) {
        let db = Database::open_in_memory().unwrap();
        let config = Config {
            database_url: ":memory:".into(),
            feed_limit: 100,
        };
        (db, config)
    }

    fn signup(db: &Database, config: &Config, name: &str) -> Value {
        run(
            db,
            config,
            Command::Signup {
                username: name.into(),
                email: format!("{name}@test.com"),
                password: Some("testpass".into()),
                image_url: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn signup_output_hides_password() {
        let (db, config) = setup();
        let out = signup(&db, &config, "u1");
        assert_eq!(out["username"], "u1");
        assert!(out.get("password").is_none());
    }

    #[test]
    fn signup_without_password_surfaces_store_error() {
        let (db, config) = setup();
        let err = run(
            &db,
            &config,
            Command::Signup {
                username: "u1".into(),
                email: "u1@test.com".into(),
                password: None,
                image_url: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<DbError>(), Some(DbError::MissingPassword)));
    }

    #[test]
    fn login_reports_result() {
        let (db, config) = setup();
        signup(&db, &config, "u1");

        let ok = run(
            &db,
            &config,
            Command::Login {
                username: "u1".into(),
                password: "testpass".into(),
            },
        )
        .unwrap();
        assert_eq!(ok["authenticated"], true);
        assert_eq!(ok["user"]["username"], "u1");

        let bad = run(
            &db,
            &config,
            Command::Login {
                username: "u1".into(),
                password: "nope".into(),
            },
        )
        .unwrap();
        assert_eq!(bad["authenticated"], false);
        assert!(bad["user"].is_null());
    }

    #[test]
    fn follow_post_and_feed() {
        let (db, config) = setup();
        signup(&db, &config, "u1");
        signup(&db, &config, "u2");

        run(
            &db,
            &config,
            Command::Follow {
                username: "u1".into(),
                target: "u2".into(),
            },
        )
        .unwrap();
        let post = run(
            &db,
            &config,
            Command::Post {
                username: "u2".into(),
                text: "a warble".into(),
            },
        )
        .unwrap();

        let feed = run(&db, &config, Command::Feed { username: "u1".into() }).unwrap();
        let messages = feed["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["id"], post["id"]);

        let show = run(&db, &config, Command::Show { username: "u2".into() }).unwrap();
        assert_eq!(show["counts"]["followers"], 1);
        assert_eq!(show["counts"]["messages"], 1);
        assert_eq!(show["followers"][0]["username"], "u1");
    }

    #[test]
    fn like_toggles() {
        let (db, config) = setup();
        signup(&db, &config, "u1");
        let post = run(
            &db,
            &config,
            Command::Post {
                username: "u1".into(),
                text: "a warble".into(),
            },
        )
        .unwrap();
        let message_id = post["id"].as_i64().unwrap();

        let like = Command::Like {
            username: "u1".into(),
            message_id,
        };
        assert_eq!(run(&db, &config, like.clone()).unwrap()["liked"], true);

        let likes = run(&db, &config, Command::Likes { username: "u1".into() }).unwrap();
        assert_eq!(likes[0]["message_id"], message_id);

        assert_eq!(run(&db, &config, like).unwrap()["liked"], false);
    }

    #[test]
    fn unknown_user_is_an_error() {
        let (db, config) = setup();
        let err = run(&db, &config, Command::Feed { username: "ghost".into() }).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn users_can_be_searched_and_deleted() {
        let (db, config) = setup();
        signup(&db, &config, "alice");
        signup(&db, &config, "bob");

        let found = run(&db, &config, Command::Users { query: Some("LI".into()) }).unwrap();
        assert_eq!(found.as_array().unwrap().len(), 1);

        let deleted = run(&db, &config, Command::DeleteUser { username: "bob".into() }).unwrap();
        assert_eq!(deleted["deleted"], true);

        let all = run(&db, &config, Command::Users { query: None }).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 1);
    }
}
