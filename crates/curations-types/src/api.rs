use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Votes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteRequest {
    /// Identifier of the thing being voted for. An absent id
    /// deserializes to empty and is rejected by the handler.
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub id: String,
    pub votes: u64,
}

#[derive(Debug, Serialize)]
pub struct VoteStatus {
    pub id: String,
    pub count: u64,
    pub exists: bool,
}

// -- Ideas --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIdeaRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// A submitted idea, both the wire shape and the persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub votes: u64,
    pub created_at: DateTime<Utc>,
}

// -- Forum --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateForumPost {
    /// Defaults to the "general" channel when absent.
    pub channel: Option<String>,
    pub title: String,
    pub message: String,
    /// Defaults to "Anonymous" when absent.
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: Uuid,
    pub channel: String,
    pub title: String,
    pub message: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of the full channel directory: a channel name and every
/// post made to it, in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPosts {
    pub channel: String,
    pub posts: Vec<ForumPost>,
}
