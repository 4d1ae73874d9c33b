use streams_business::{
    BusinessConfig, CreateTagCommand, CreateTagCompute, FetchTagsCommand, NewstreamInput,
    SubmitNewstreamCommand, SubmitNewstreamCompute, TagAddInput, TagDirectoryCompute,
};
use streams_states::StateCtx;

use crate::widgets::DropdownState;

/// The main application state: one fully wired [`StateCtx`].
pub struct State {
    pub ctx: StateCtx,
}

impl Default for State {
    fn default() -> Self {
        Self::with_config(BusinessConfig::default())
    }
}

impl State {
    /// State wired against an arbitrary backend; used by the test harnesses
    /// to point at a mock server.
    pub fn test(base_url: String) -> Self {
        Self::with_config(BusinessConfig::new(base_url))
    }

    fn with_config(config: BusinessConfig) -> Self {
        let mut ctx = StateCtx::new();

        ctx.add_state(config);
        ctx.add_state(NewstreamInput::default());
        ctx.add_state(TagAddInput::default());
        ctx.add_state(DropdownState::default());

        ctx.record_compute(TagDirectoryCompute::default());
        ctx.record_compute(SubmitNewstreamCompute::default());
        ctx.record_compute(CreateTagCompute::default());

        ctx.record_command(FetchTagsCommand);
        ctx.record_command(SubmitNewstreamCommand::default());
        ctx.record_command(CreateTagCommand::default());

        Self { ctx }
    }
}
