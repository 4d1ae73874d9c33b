//! Newstream entry submission: the create-then-link sequence.
//!
//! One attempt is: POST the entry document; on a 200, PUT the tag
//! connections onto the created entry. A non-200 create, a transport error,
//! a timeout or an unparsable body fails the attempt; the whole sequence is
//! then retried up to [`MAX_RETRIES`] times with a fixed delay in between. A
//! failed link is terminal — the entry stays created, nothing is rolled
//! back, and no retry happens.

use std::any::Any;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use streams_states::{
    Command, CommandFuture, CommandSnapshot, Compute, LatestOnlyUpdater, State, assign_impl,
    state_assign_impl,
};

use crate::error::SubmitError;
use crate::http::Client;
use crate::tags::{Tag, TagDirectoryCompute};
use crate::{BusinessConfig, notify};

/// Hard bound on the create request; past it the attempt counts as failed.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(120);
/// Fixed pause between attempts. No backoff growth.
pub const RETRY_DELAY: Duration = Duration::from_secs(10);
/// Retries after the initial attempt; four attempts in total.
pub const MAX_RETRIES: u32 = 3;

/// Locale the backend stores entries under.
pub const LOCALE: &str = "zh-Hant-HK";

/// Markers prepended to the user's auto-tag string so backend jobs can tell
/// hand-entered records from imported ones.
const AUTO_TAG_MARKERS: [&str; 2] = ["__test", "__hand_input"];

/// Editable state of the entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewstreamInput {
    pub title: String,
    pub url: String,
    /// When the described event happened, ISO-8601. Seeded with "now".
    pub date_happened: String,
    pub content: String,
    /// Comma-style free-text tags, passed through into the entry metadata.
    pub auto_tags: String,
    pub quick_comment: String,
    /// Selected tag identifiers, toggled through the selector dropdown.
    pub tags: Vec<i64>,
    pub pass_phrase_1: String,
    pub pass_phrase_2: String,
}

impl Default for NewstreamInput {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            date_happened: Utc::now().to_rfc3339(),
            content: String::new(),
            auto_tags: String::new(),
            quick_comment: String::new(),
            tags: Vec::new(),
            pass_phrase_1: String::new(),
            pass_phrase_2: String::new(),
        }
    }
}

impl NewstreamInput {
    /// Add `id` when absent, remove it when present. Selection order carries
    /// no meaning; toggling twice restores the original set.
    pub fn toggle_tag(&mut self, id: i64) {
        if let Some(position) = self.tags.iter().position(|tag| *tag == id) {
            self.tags.remove(position);
        } else {
            self.tags.push(id);
        }
    }

    pub fn has_tag(&self, id: i64) -> bool {
        self.tags.contains(&id)
    }
}

impl State for NewstreamInput {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

// Wire types. Field names are the backend's schema, misspellings included;
// they must serialize byte-identically to what the backend already accepts.

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateNewstreamRequest {
    pub data: NewstreamDocument,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewstreamDocument {
    pub title: String,
    pub url: String,
    #[serde(rename = "dateHappened")]
    pub date_happened: String,
    pub content: Vec<ContentBlock>,
    pub meta: NewstreamMeta,
    #[serde(rename = "public")]
    pub is_public: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub locale: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub children: Vec<ContentChild>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ContentChild {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewstreamMeta {
    #[serde(rename = "quckTag")]
    pub quck_tag: String,
    #[serde(rename = "quckComment")]
    pub quck_comment: String,
}

#[derive(Debug, Deserialize)]
struct CreateNewstreamResponse {
    data: CreatedNewstream,
}

#[derive(Debug, Deserialize)]
struct CreatedNewstream {
    id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ConnectTagsRequest {
    pub data: ConnectTagsData,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ConnectTagsData {
    pub tags: TagConnections,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TagConnections {
    pub connect: Vec<TagRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TagRef {
    pub id: i64,
}

/// Build the entry document for one attempt. `now` stamps creation, update
/// and publication alike; the content becomes a single paragraph block.
pub(crate) fn entry_payload(input: &NewstreamInput, now: &str) -> CreateNewstreamRequest {
    CreateNewstreamRequest {
        data: NewstreamDocument {
            title: input.title.clone(),
            url: input.url.clone(),
            date_happened: input.date_happened.clone(),
            content: vec![ContentBlock {
                kind: "paragraph".to_owned(),
                children: vec![ContentChild {
                    text: input.content.clone(),
                    kind: "text".to_owned(),
                }],
            }],
            meta: NewstreamMeta {
                quck_tag: [
                    AUTO_TAG_MARKERS[0],
                    AUTO_TAG_MARKERS[1],
                    input.auto_tags.as_str(),
                ]
                .join(", "),
                quck_comment: input.quick_comment.clone(),
            },
            is_public: false,
            created_at: now.to_owned(),
            updated_at: now.to_owned(),
            published_at: now.to_owned(),
            locale: LOCALE.to_owned(),
        },
    }
}

/// Selected ids reduced to those present in the fetched directory. An id the
/// directory no longer knows (a race with the backend) is dropped silently
/// rather than failing the link.
pub(crate) fn linkable_tags(selected: &[i64], directory: &[Tag]) -> Vec<TagRef> {
    selected
        .iter()
        .filter(|id| directory.iter().any(|tag| tag.id == **id))
        .map(|id| TagRef { id: *id })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    /// An attempt is on the wire; `attempt` counts from 0.
    InFlight {
        attempt: u32,
    },
    Success {
        id: i64,
    },
    /// The entry exists but tag linking failed. Terminal; not retried.
    LinkingFailed {
        id: i64,
        status: u16,
    },
    Failed(String),
}

/// Compute-shaped cache for the submission outcome; fed by
/// [`SubmitNewstreamCommand`].
#[derive(Debug, Clone, Default)]
pub struct SubmitNewstreamCompute {
    pub status: SubmitStatus,
}

impl SubmitNewstreamCompute {
    pub fn in_flight(&self) -> bool {
        matches!(self.status, SubmitStatus::InFlight { .. })
    }
}

impl Compute for SubmitNewstreamCompute {
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

/// One attempt that got past the create step.
enum Attempt {
    Linked { id: i64 },
    LinkFailed { id: i64, status: u16 },
}

/// Submit the entry form: validate, then run the create-then-link sequence
/// under the retry policy.
///
/// `retry_delay` is a field so tests can shrink the pause; dispatch always
/// uses the default, [`RETRY_DELAY`].
#[derive(Debug, Clone)]
pub struct SubmitNewstreamCommand {
    pub retry_delay: Duration,
}

impl Default for SubmitNewstreamCommand {
    fn default() -> Self {
        Self {
            retry_delay: RETRY_DELAY,
        }
    }
}

impl Command for SubmitNewstreamCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input: NewstreamInput = snap.state::<NewstreamInput>();
        let config: BusinessConfig = snap.state::<BusinessConfig>();
        let directory: TagDirectoryCompute = snap.compute::<TagDirectoryCompute>();
        let retry_delay = self.retry_delay;

        Box::pin(async move {
            if input.pass_phrase_1.is_empty() || input.pass_phrase_2.is_empty() {
                notify::error("Wrong Pass Phrase!");
                updater.set(SubmitNewstreamCompute {
                    status: SubmitStatus::Failed(SubmitError::MissingCredentials.to_string()),
                });
                return;
            }

            if input.title.is_empty() || input.url.is_empty() {
                notify::error("Title and URL are required!");
                let field = if input.title.is_empty() { "title" } else { "url" };
                updater.set(SubmitNewstreamCompute {
                    status: SubmitStatus::Failed(
                        SubmitError::MissingRequiredField(field).to_string(),
                    ),
                });
                return;
            }

            for attempt in 0..=MAX_RETRIES {
                if cancel.is_cancelled() {
                    return;
                }

                updater.set(SubmitNewstreamCompute {
                    status: SubmitStatus::InFlight { attempt },
                });

                match submit_once(&config, &input, directory.tags()).await {
                    Ok(Attempt::Linked { id }) => {
                        notify::success("Entry and tags submitted successfully!");
                        updater.set(SubmitNewstreamCompute {
                            status: SubmitStatus::Success { id },
                        });
                        return;
                    }
                    Ok(Attempt::LinkFailed { id, status }) => {
                        notify::error(format!("Failed to link tags: {status}"));
                        updater.set(SubmitNewstreamCompute {
                            status: SubmitStatus::LinkingFailed { id, status },
                        });
                        return;
                    }
                    Err(err) if attempt < MAX_RETRIES => {
                        log::warn!("submit attempt {} failed: {err}", attempt + 1);
                        notify::warning(format!(
                            "Attempt {} failed. Retrying in 10 seconds...",
                            attempt + 1
                        ));
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            _ = crate::http::sleep(retry_delay) => {}
                        }
                    }
                    Err(err) => {
                        log::error!("submit failed after {} attempts: {err}", MAX_RETRIES + 1);
                        notify::error("Failed to submit after 3 attempts");
                        updater.set(SubmitNewstreamCompute {
                            status: SubmitStatus::Failed(err.to_string()),
                        });
                    }
                }
            }
        })
    }
}

/// One full create-then-link attempt.
async fn submit_once(
    config: &BusinessConfig,
    input: &NewstreamInput,
    directory: &[Tag],
) -> Result<Attempt, SubmitError> {
    let token = config.bearer(&input.pass_phrase_1, &input.pass_phrase_2);
    let now = Utc::now().to_rfc3339();

    let response = Client::post(format!("{}/newstreams", config.api_url()))
        .header("Authorization", format!("Bearer {token}"))
        .json(&entry_payload(input, &now))
        .map_err(|e| SubmitError::Parse(e.to_string()))?
        .timeout(SUBMIT_TIMEOUT)
        .send()
        .await?;

    // The backend answers creation with 200 exactly; anything else (201
    // included) is treated as a failed attempt.
    if response.status != 200 {
        return Err(SubmitError::Status(response.status));
    }

    let created: CreateNewstreamResponse = response
        .json()
        .map_err(|e| SubmitError::Parse(e.to_string()))?;
    let id = created.data.id;

    let link_body = ConnectTagsRequest {
        data: ConnectTagsData {
            tags: TagConnections {
                connect: linkable_tags(&input.tags, directory),
            },
        },
    };

    let link_response = Client::put(format!("{}/newstreams/{id}", config.api_url()))
        .header("Authorization", format!("Bearer {token}"))
        .json(&link_body)
        .map_err(|e| SubmitError::Parse(e.to_string()))?
        .send()
        .await?;

    if link_response.is_success() {
        Ok(Attempt::Linked { id })
    } else {
        Ok(Attempt::LinkFailed {
            id,
            status: link_response.status,
        })
    }
}
