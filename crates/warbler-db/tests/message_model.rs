use warbler_db::{Database, UserRow};

fn setup() -> (Database, UserRow) {
    let db = Database::open_in_memory().unwrap();
    db.reset().unwrap();

    let user = db
        .signup(Some("test"), Some("test@test.com"), Some("testpass"), None)
        .unwrap();

    (db, user)
}

#[test]
fn test_message() {
    let (db, user) = setup();

    db.create_message(user.id, "a warble").unwrap();

    let messages = db.get_messages_by_user(user.id).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "a warble");
    assert_eq!(messages[0].user_id, user.id);
    assert!(!messages[0].timestamp.is_empty());
}

#[test]
fn test_message_requires_existing_author() {
    let (db, _) = setup();
    let err = db.create_message(999_999, "orphan").unwrap_err();
    assert!(err.is_integrity(), "got {err:?}");
}

#[test]
fn test_message_length_limit() {
    let (db, user) = setup();

    let at_limit = "x".repeat(140);
    db.create_message(user.id, &at_limit).unwrap();

    let err = db.create_message(user.id, &"x".repeat(141)).unwrap_err();
    assert!(err.is_integrity(), "got {err:?}");
    assert_eq!(db.get_messages_by_user(user.id).unwrap().len(), 1);
}

#[test]
fn test_delete_message() {
    let (db, user) = setup();
    let msg = db.create_message(user.id, "a warble").unwrap();

    assert!(db.delete_message(msg.id).unwrap());
    assert!(!db.delete_message(msg.id).unwrap());
    assert!(db.get_message(msg.id).unwrap().is_none());
}

#[test]
fn test_likes() {
    let (db, user) = setup();
    let u2 = db
        .signup(Some("test2"), Some("test2@test.com"), Some("testpass"), None)
        .unwrap();
    let msg = db.create_message(user.id, "a warble").unwrap();

    db.like(u2.id, msg.id).unwrap();

    let likes = db.get_likes_by_user(u2.id).unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].message_id, msg.id);

    let liked = db.get_liked_messages(u2.id).unwrap();
    assert_eq!(liked, vec![msg]);
}

#[test]
fn test_duplicate_like_is_integrity_error() {
    let (db, user) = setup();
    let msg = db.create_message(user.id, "a warble").unwrap();

    db.like(user.id, msg.id).unwrap();
    let err = db.like(user.id, msg.id).unwrap_err();
    assert!(err.is_integrity(), "got {err:?}");
}

#[test]
fn test_toggle_like() {
    let (db, user) = setup();
    let u2 = db
        .signup(Some("test2"), Some("test2@test.com"), Some("testpass"), None)
        .unwrap();
    let msg = db.create_message(user.id, "a warble").unwrap();

    assert!(db.toggle_like(u2.id, msg.id).unwrap());
    assert_eq!(db.get_likes_by_user(u2.id).unwrap().len(), 1);

    assert!(!db.toggle_like(u2.id, msg.id).unwrap());
    assert!(db.get_likes_by_user(u2.id).unwrap().is_empty());
}

#[test]
fn test_deleting_message_removes_likes() {
    let (db, user) = setup();
    let msg = db.create_message(user.id, "a warble").unwrap();
    db.like(user.id, msg.id).unwrap();

    db.delete_message(msg.id).unwrap();
    assert!(db.get_likes_by_user(user.id).unwrap().is_empty());
}

#[test]
fn test_home_feed() {
    let (db, user) = setup();
    let followed = db
        .signup(Some("followed"), Some("f@test.com"), Some("testpass"), None)
        .unwrap();
    let stranger = db
        .signup(Some("stranger"), Some("s@test.com"), Some("testpass"), None)
        .unwrap();
    db.follow(user.id, followed.id).unwrap();

    let first = db.create_message(user.id, "first").unwrap();
    let second = db.create_message(followed.id, "second").unwrap();
    db.create_message(stranger.id, "not in feed").unwrap();
    let third = db.create_message(user.id, "third").unwrap();

    let feed: Vec<i64> = db.home_feed(user.id, 100).unwrap().iter().map(|m| m.id).collect();
    assert_eq!(feed, vec![third.id, second.id, first.id]);

    let limited = db.home_feed(user.id, 2).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, third.id);

    // Following is one-directional.
    let theirs: Vec<i64> = db.home_feed(followed.id, 100).unwrap().iter().map(|m| m.id).collect();
    assert_eq!(theirs, vec![second.id]);
}
