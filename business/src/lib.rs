//! Business layer of the streams client.
//!
//! Owns everything that is not rendering: configuration, the
//! platform-abstracted HTTP client, the tag directory, the two submission
//! services (newstream entries and tags), the notification queue, and the
//! page-view beacon. The UI crate only reads states/computes and dispatches
//! the commands exported here.

pub mod analytics;
pub mod config;
pub mod error;
pub mod http;
pub mod newstream;
pub mod notify;
pub mod tag_add;
pub mod tags;

pub use config::BusinessConfig;
pub use error::SubmitError;
pub use newstream::{NewstreamInput, SubmitNewstreamCommand, SubmitNewstreamCompute, SubmitStatus};
pub use notify::{Notice, NoticeLevel};
pub use tag_add::{CreateTagCommand, CreateTagCompute, CreateTagStatus, TagAddInput};
pub use tags::{FetchTagsCommand, Tag, TagDirectoryCompute, TagDirectoryStatus};
