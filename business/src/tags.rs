//! Tag directory: the read-only list of tags both forms select from.
//!
//! `FetchTagsCommand` is dispatched once at app startup. It performs a single
//! GET with no retry; on any failure the directory stays empty and one error
//! notice is pushed. A superseded fetch cannot clobber a newer one because
//! command updates are generation-gated.

use std::any::Any;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use streams_states::{
    Command, CommandFuture, CommandSnapshot, Compute, LatestOnlyUpdater, assign_impl,
};

use crate::BusinessConfig;
use crate::http::Client;
use crate::notify;

/// A tag as the backend serves it: id plus a Strapi attribute envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub attributes: TagAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAttributes {
    pub name: String,
}

impl Tag {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            attributes: TagAttributes { name: name.into() },
        }
    }

    pub fn name(&self) -> &str {
        &self.attributes.name
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct TagListResponse {
    pub data: Vec<Tag>,
}

/// Case-insensitive substring match used by the tag browser filter.
/// An empty query matches everything.
pub fn matches_query(name: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&query.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagDirectoryStatus {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Tag>),
    Error(String),
}

/// Compute-shaped cache for the fetched tag list.
///
/// Updated only by [`FetchTagsCommand`]; the UI reads it every frame.
#[derive(Debug, Clone, Default)]
pub struct TagDirectoryCompute {
    pub status: TagDirectoryStatus,
}

impl TagDirectoryCompute {
    /// The fetched tags, or an empty slice while not loaded.
    pub fn tags(&self) -> &[Tag] {
        match &self.status {
            TagDirectoryStatus::Loaded(tags) => tags,
            _ => &[],
        }
    }

    pub fn find(&self, id: i64) -> Option<&Tag> {
        self.tags().iter().find(|tag| tag.id == id)
    }

    /// Tags whose name contains `query`, case-folded. Empty query: all tags.
    pub fn matching<'a>(&'a self, query: &str) -> Vec<&'a Tag> {
        self.tags()
            .iter()
            .filter(|tag| matches_query(tag.name(), query))
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, TagDirectoryStatus::Loading)
    }
}

impl Compute for TagDirectoryCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Fetch the full tag collection. One shot, no retry.
#[derive(Debug, Default)]
pub struct FetchTagsCommand;

impl Command for FetchTagsCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let config: BusinessConfig = snap.state::<BusinessConfig>();

        Box::pin(async move {
            updater.set(TagDirectoryCompute {
                status: TagDirectoryStatus::Loading,
            });

            let url = format!("{}/tags", config.api_url());
            let response = match Client::get(&url).send().await {
                Ok(response) => response,
                Err(err) => {
                    log::error!("FetchTagsCommand: request failed: {err}");
                    notify::error("Failed to load tags.");
                    updater.set(TagDirectoryCompute {
                        status: TagDirectoryStatus::Error(err.message),
                    });
                    return;
                }
            };

            if !response.is_success() {
                log::error!("FetchTagsCommand: backend returned {}", response.status);
                notify::error("Failed to load tags.");
                updater.set(TagDirectoryCompute {
                    status: TagDirectoryStatus::Error(format!("status {}", response.status)),
                });
                return;
            }

            match response.json::<TagListResponse>() {
                Ok(list) => {
                    log::info!("FetchTagsCommand: loaded {} tags", list.data.len());
                    updater.set(TagDirectoryCompute {
                        status: TagDirectoryStatus::Loaded(list.data),
                    });
                }
                Err(err) => {
                    log::error!("FetchTagsCommand: failed to parse tag list: {err}");
                    notify::error("Failed to load tags.");
                    updater.set(TagDirectoryCompute {
                        status: TagDirectoryStatus::Error(format!("parse error: {err}")),
                    });
                }
            }
        })
    }
}
