use streams_business::FetchTagsCommand;
use streams_business::analytics::{self, AnalyticsConfig};
use streams_states::StateCtx;

use crate::{state::State, widgets};

pub struct StreamsApp {
    state: State,
    toasts: widgets::ToastState,
}

impl StreamsApp {
    /// Called once before the first frame: kicks off the tag directory fetch
    /// and records the page view.
    pub fn new(state: State) -> Self {
        Self::with_analytics(state, AnalyticsConfig::default())
    }

    /// Like [`Self::new`] with a custom collector target; the test harness
    /// points this at a mock server.
    pub fn with_analytics(mut state: State, analytics: AnalyticsConfig) -> Self {
        state.ctx.dispatch::<FetchTagsCommand>();
        analytics::track_page_view(&analytics);

        Self {
            state,
            toasts: widgets::ToastState::default(),
        }
    }

    pub fn ctx_mut(&mut self) -> &mut StateCtx {
        &mut self.state.ctx
    }
}

impl eframe::App for StreamsApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply results published by background commands before rendering.
        self.state.ctx.sync_computes();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Streams");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    widgets::build_info(ui);
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                widgets::newstream_form(&mut self.state.ctx, ui);
                ui.add_space(12.0);
                ui.separator();
                ui.add_space(12.0);
                widgets::tag_add_form(&mut self.state.ctx, ui);
            });
        });

        widgets::toasts(&mut self.toasts, ctx);

        // Command results arrive over a channel; poll for them even while no
        // input events are coming in.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
