//! The tag form: name/count/description plus a filterable read-only browser
//! over the existing tags.

use egui::{Response, Ui};

use streams_business::{
    CreateTagCommand, CreateTagCompute, CreateTagStatus, TagAddInput, TagDirectoryCompute,
};
use streams_states::StateCtx;

use super::newstream_form::{COLOR_GREEN, COLOR_RED};
use super::tag_selector::{DropdownState, tag_browser};

pub fn tag_add_form(state_ctx: &mut StateCtx, ui: &mut Ui) -> Response {
    let directory = state_ctx
        .cached::<TagDirectoryCompute>()
        .cloned()
        .unwrap_or_default();
    let status = state_ctx
        .cached::<CreateTagCompute>()
        .cloned()
        .unwrap_or_default();

    let mut input = state_ctx.state::<TagAddInput>().clone();
    let mut open = state_ctx.state::<DropdownState>().browser_open;
    let mut should_submit = false;

    let response = ui
        .vertical(|ui| {
            ui.heading("Add tag");
            ui.add_space(8.0);

            egui::Grid::new("tag_form")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Tag name *");
                    ui.text_edit_singleline(&mut input.name);
                    ui.end_row();

                    ui.label("Count");
                    ui.add(egui::DragValue::new(&mut input.count));
                    ui.end_row();

                    ui.label("Description");
                    ui.text_edit_singleline(&mut input.description);
                    ui.end_row();

                    ui.label("Query tag");
                    ui.text_edit_singleline(&mut input.query);
                    ui.end_row();

                    ui.label("Tags");
                    tag_browser(&input.query, &directory, &mut open, ui);
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
                if ui.button("Submit tag").clicked() {
                    should_submit = true;
                }
                create_status(&status.status, ui);
            });
        })
        .response;

    let stored = state_ctx.state_mut::<TagAddInput>();
    if *stored != input {
        *stored = input;
    }
    state_ctx.state_mut::<DropdownState>().browser_open = open;

    if should_submit {
        state_ctx.dispatch::<CreateTagCommand>();
    }

    response
}

fn create_status(status: &CreateTagStatus, ui: &mut Ui) {
    match status {
        CreateTagStatus::Idle => {}
        CreateTagStatus::InFlight { attempt } => {
            ui.spinner();
            if *attempt > 0 {
                ui.label(format!("attempt {}", attempt + 1));
            }
        }
        CreateTagStatus::Created { id, name } => {
            ui.colored_label(COLOR_GREEN, format!("Created \"{name}\" (#{id})"));
        }
        CreateTagStatus::Failed(message) => {
            ui.colored_label(COLOR_RED, message);
        }
    }
}
