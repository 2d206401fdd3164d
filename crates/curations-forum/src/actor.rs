use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use uuid::Uuid;

use curations_kv::Namespace;
use curations_types::api::{ChannelPosts, CreateForumPost, ForumPost};

/// Channel a post lands in when the request names none.
pub const DEFAULT_CHANNEL: &str = "general";
/// Author recorded when the request names none.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

const COMMAND_BUFFER: usize = 64;

enum Command {
    Append {
        req: CreateForumPost,
        reply: oneshot::Sender<Result<ForumPost>>,
    },
    Posts {
        channel: String,
        reply: oneshot::Sender<Result<Vec<ForumPost>>>,
    },
    Channels {
        reply: oneshot::Sender<Result<Vec<ChannelPosts>>>,
    },
}

/// Client handle to one forum actor. Cheap to clone; every clone
/// addresses the same task, and the task's single receiver keeps all
/// operations against the instance's storage strictly sequential.
#[derive(Clone)]
pub struct ForumHandle {
    tx: mpsc::Sender<Command>,
}

impl ForumHandle {
    /// Append a post to its channel's list and return the stored entry.
    pub async fn append(&self, req: CreateForumPost) -> Result<ForumPost> {
        self.call(|reply| Command::Append { req, reply }).await
    }

    /// Posts for one channel, arrival order. Empty for an unseen channel.
    pub async fn posts(&self, channel: &str) -> Result<Vec<ForumPost>> {
        let channel = channel.to_string();
        self.call(|reply| Command::Posts { channel, reply }).await
    }

    /// Every channel with its full post list.
    pub async fn channels(&self) -> Result<Vec<ChannelPosts>> {
        self.call(|reply| Command::Channels { reply }).await
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| anyhow!("forum actor is gone"))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("forum actor dropped the request"))?
    }
}

/// Spawn the actor task for one logical forum instance over its
/// private namespace. The handle is the only way in.
pub fn spawn(storage: Namespace) -> ForumHandle {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    tokio::spawn(run(storage, rx));
    ForumHandle { tx }
}

async fn run(storage: Namespace, mut rx: mpsc::Receiver<Command>) {
    info!("Forum actor started on namespace {}", storage.name());
    // One command at a time: each read-modify-write completes before
    // the next command is taken off the queue.
    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Append { req, reply } => {
                let _ = reply.send(append(&storage, req).await);
            }
            Command::Posts { channel, reply } => {
                let _ = reply.send(channel_posts(&storage, channel).await);
            }
            Command::Channels { reply } => {
                let _ = reply.send(all_channels(&storage).await);
            }
        }
    }
    info!("Forum actor on namespace {} stopped", storage.name());
}

async fn append(storage: &Namespace, req: CreateForumPost) -> Result<ForumPost> {
    let storage = storage.clone();
    tokio::task::spawn_blocking(move || {
        let channel = req.channel.unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
        let mut posts = load_posts(&storage, &channel)?;
        let post = ForumPost {
            id: Uuid::new_v4(),
            channel: channel.clone(),
            title: req.title,
            message: req.message,
            author: req.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            created_at: Utc::now(),
        };
        posts.push(post.clone());
        storage.put(&channel, &serde_json::to_string(&posts)?)?;
        Ok(post)
    })
    .await
    .context("forum append task panicked")?
}

async fn channel_posts(storage: &Namespace, channel: String) -> Result<Vec<ForumPost>> {
    let storage = storage.clone();
    tokio::task::spawn_blocking(move || load_posts(&storage, &channel))
        .await
        .context("forum read task panicked")?
}

async fn all_channels(storage: &Namespace) -> Result<Vec<ChannelPosts>> {
    let storage = storage.clone();
    tokio::task::spawn_blocking(move || {
        let mut channels = Vec::new();
        for channel in storage.list()? {
            let posts = load_posts(&storage, &channel)?;
            channels.push(ChannelPosts { channel, posts });
        }
        Ok(channels)
    })
    .await
    .context("forum snapshot task panicked")?
}

fn load_posts(storage: &Namespace, channel: &str) -> Result<Vec<ForumPost>> {
    match storage.get(channel)? {
        Some(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("corrupt post list for channel '{channel}'")),
        None => Ok(Vec::new()),
    }
}
