//! Tag creation: a single-step create under the same retry policy as entry
//! submission, with no second linking request.

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
use crate::newstream::{LOCALE, MAX_RETRIES, RETRY_DELAY, SUBMIT_TIMEOUT};
use crate::{BusinessConfig, notify};

/// Editable state of the tag form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAddInput {
    pub name: String,
    pub count: i64,
    pub description: String,
    /// Filter applied to the tag browser below the form. Not submitted.
    pub query: String,
    pub pass_phrase_1: String,
    pub pass_phrase_2: String,
}

impl State for TagAddInput {
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

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateTagRequest {
    pub data: TagDocument,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TagDocument {
    pub name: String,
    pub count: i64,
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub locale: String,
}

#[derive(Debug, Deserialize)]
struct CreateTagResponse {
    data: CreatedTag,
}

/// The backend may answer 200 with no id when creation was rejected; that is
/// a terminal failure, not a retryable one.
#[derive(Debug, Deserialize)]
struct CreatedTag {
    id: Option<i64>,
    name: Option<String>,
}

pub(crate) fn tag_payload(input: &TagAddInput, now: &str) -> CreateTagRequest {
    CreateTagRequest {
        data: TagDocument {
            name: input.name.clone(),
            count: input.count,
            description: input.description.clone(),
            published_at: now.to_owned(),
            locale: LOCALE.to_owned(),
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CreateTagStatus {
    #[default]
    Idle,
    InFlight {
        attempt: u32,
    },
    Created {
        id: i64,
        name: String,
    },
    Failed(String),
}

/// Compute-shaped cache for the tag creation outcome.
#[derive(Debug, Clone, Default)]
pub struct CreateTagCompute {
    pub status: CreateTagStatus,
}

impl CreateTagCompute {
    pub fn in_flight(&self) -> bool {
        matches!(self.status, CreateTagStatus::InFlight { .. })
    }
}

impl Compute for CreateTagCompute {
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

enum Attempt {
    Created { id: i64, name: String },
    Rejected,
}

/// Submit the tag form.
#[derive(Debug, Clone)]
pub struct CreateTagCommand {
    pub retry_delay: Duration,
}

impl Default for CreateTagCommand {
    fn default() -> Self {
        Self {
            retry_delay: RETRY_DELAY,
        }
    }
}

impl Command for CreateTagCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input: TagAddInput = snap.state::<TagAddInput>();
        let config: BusinessConfig = snap.state::<BusinessConfig>();
        let retry_delay = self.retry_delay;

        Box::pin(async move {
            if input.pass_phrase_1.is_empty() || input.pass_phrase_2.is_empty() {
                notify::error("Wrong Pass Phrase!");
                updater.set(CreateTagCompute {
                    status: CreateTagStatus::Failed(SubmitError::MissingCredentials.to_string()),
                });
                return;
            }

            if input.name.is_empty() {
                notify::error("Name is required!");
                updater.set(CreateTagCompute {
                    status: CreateTagStatus::Failed(
                        SubmitError::MissingRequiredField("name").to_string(),
                    ),
                });
                return;
            }

            for attempt in 0..=MAX_RETRIES {
                if cancel.is_cancelled() {
                    return;
                }

                updater.set(CreateTagCompute {
                    status: CreateTagStatus::InFlight { attempt },
                });

                match create_once(&config, &input).await {
                    Ok(Attempt::Created { id, name }) => {
                        notify::success(format!("Tag \"{name}\" ({id}) created successfully!"));
                        updater.set(CreateTagCompute {
                            status: CreateTagStatus::Created { id, name },
                        });
                        return;
                    }
                    Ok(Attempt::Rejected) => {
                        notify::error("Failed to create tag.");
                        updater.set(CreateTagCompute {
                            status: CreateTagStatus::Failed(
                                "backend accepted the request but assigned no id".to_owned(),
                            ),
                        });
                        return;
                    }
                    Err(err) if attempt < MAX_RETRIES => {
                        log::warn!("tag create attempt {} failed: {err}", attempt + 1);
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
                        log::error!(
                            "tag create failed after {} attempts: {err}",
                            MAX_RETRIES + 1
                        );
                        notify::error("Failed to submit after 3 attempts");
                        updater.set(CreateTagCompute {
                            status: CreateTagStatus::Failed(err.to_string()),
                        });
                    }
                }
            }
        })
    }
}

async fn create_once(config: &BusinessConfig, input: &TagAddInput) -> Result<Attempt, SubmitError> {
    let token = config.bearer(&input.pass_phrase_1, &input.pass_phrase_2);
    let now = Utc::now().to_rfc3339();

    let response = Client::post(format!("{}/tags", config.api_url()))
        .header("Authorization", format!("Bearer {token}"))
        .json(&tag_payload(input, &now))
        .map_err(|e| SubmitError::Parse(e.to_string()))?
        .timeout(SUBMIT_TIMEOUT)
        .send()
        .await?;

    if response.status != 200 {
        return Err(SubmitError::Status(response.status));
    }

    let created: CreateTagResponse = response
        .json()
        .map_err(|e| SubmitError::Parse(e.to_string()))?;

    match created.data.id {
        Some(id) => Ok(Attempt::Created {
            id,
            name: created.data.name.unwrap_or_else(|| input.name.clone()),
        }),
        None => Ok(Attempt::Rejected),
    }
}
