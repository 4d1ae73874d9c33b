//! The entry form: reads the submission status, renders the fields, writes
//! edits back into the input state, and dispatches the submit command.

use egui::{Color32, Response, Ui};

use streams_business::{
    NewstreamInput, SubmitNewstreamCommand, SubmitNewstreamCompute, SubmitStatus,
    TagDirectoryCompute,
};
use streams_states::StateCtx;

use super::tag_selector::{DropdownState, tag_selector};

/// Green color for success status
pub(crate) const COLOR_GREEN: Color32 = Color32::from_rgb(34, 139, 34);
/// Red color for error status
pub(crate) const COLOR_RED: Color32 = Color32::from_rgb(220, 53, 69);
/// Orange color for partial success
pub(crate) const COLOR_ORANGE: Color32 = Color32::from_rgb(255, 165, 0);

pub fn newstream_form(state_ctx: &mut StateCtx, ui: &mut Ui) -> Response {
    let directory = state_ctx
        .cached::<TagDirectoryCompute>()
        .cloned()
        .unwrap_or_default();
    let submit = state_ctx
        .cached::<SubmitNewstreamCompute>()
        .cloned()
        .unwrap_or_default();

    let mut input = state_ctx.state::<NewstreamInput>().clone();
    let mut open = state_ctx.state::<DropdownState>().entry_open;
    let mut should_submit = false;

    let response = ui
        .vertical(|ui| {
            ui.heading("New entry");
            ui.add_space(8.0);

            egui::Grid::new("entry_form")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Title *");
                    ui.text_edit_singleline(&mut input.title);
                    ui.end_row();

                    ui.label("URL *");
                    ui.text_edit_singleline(&mut input.url);
                    ui.end_row();

                    ui.label("Date happened");
                    ui.text_edit_singleline(&mut input.date_happened);
                    ui.end_row();

                    ui.label("Content");
                    ui.text_edit_multiline(&mut input.content);
                    ui.end_row();

                    ui.label("Auto tags");
                    ui.text_edit_singleline(&mut input.auto_tags);
                    ui.end_row();

                    ui.label("Quick comment");
                    ui.text_edit_multiline(&mut input.quick_comment);
                    ui.end_row();

                    ui.label("Tags");
                    tag_selector(&mut input, &directory, &mut open, ui);
                    ui.end_row();

                    ui.label("Pass Phrase 1");
                    ui.add(egui::TextEdit::singleline(&mut input.pass_phrase_1).password(true));
                    ui.end_row();

                    ui.label("Pass Phrase 2");
                    ui.add(egui::TextEdit::singleline(&mut input.pass_phrase_2).password(true));
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                // Deliberately enabled while a submission is in flight:
                // repeated clicks race, matching the backend's view of the
                // original client.
                if ui.button("Submit").clicked() {
                    should_submit = true;
                }
                submit_status(&submit.status, ui);
            });
        })
        .response;

    let stored = state_ctx.state_mut::<NewstreamInput>();
    if *stored != input {
        *stored = input;
    }
    state_ctx.state_mut::<DropdownState>().entry_open = open;

    if should_submit {
        state_ctx.dispatch::<SubmitNewstreamCommand>();
    }

    response
}

fn submit_status(status: &SubmitStatus, ui: &mut Ui) {
    match status {
        SubmitStatus::Idle => {}
        SubmitStatus::InFlight { attempt } => {
            ui.spinner();
            if *attempt > 0 {
                ui.label(format!("attempt {}", attempt + 1));
            }
        }
        SubmitStatus::Success { id } => {
            ui.colored_label(COLOR_GREEN, format!("Submitted (#{id})"));
        }
        SubmitStatus::LinkingFailed { id, status } => {
            ui.colored_label(
                COLOR_ORANGE,
                format!("Entry #{id} created, but tag linking failed ({status})"),
            );
        }
        SubmitStatus::Failed(message) => {
            ui.colored_label(COLOR_RED, message);
        }
    }
}
