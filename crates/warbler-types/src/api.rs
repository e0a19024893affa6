use serde::{Deserialize, Serialize};

use crate::models::{Message, User};

// -- Users --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounts {
    pub messages: u32,
    pub following: u32,
    pub followers: u32,
    pub likes: u32,
}

/// A user's page: profile, counts and their own messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub counts: UserCounts,
    pub messages: Vec<Message>,
    pub following: Vec<User>,
    pub followers: Vec<User>,
}

// -- Auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub user: Option<User>,
}

// -- Social graph --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowResponse {
    pub follower_id: i64,
    pub followed_id: i64,
    pub following: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleLikeResponse {
    pub message_id: i64,
    pub liked: bool,
}

// -- Feed --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub user_id: i64,
    pub messages: Vec<Message>,
}
