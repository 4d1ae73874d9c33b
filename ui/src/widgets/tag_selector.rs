//! Shared tag dropdown: chips for the current selection plus a toggle list
//! over the fetched directory.

use std::any::Any;

use egui::{Frame, Response, RichText, Ui};

use streams_business::{NewstreamInput, TagDirectoryCompute};
use streams_states::{State, state_assign_impl};

/// Open/closed flags of the two dropdowns. Render-local: kept out of command
/// snapshots on purpose.
#[derive(Debug, Clone, Default)]
pub struct DropdownState {
    pub entry_open: bool,
    pub browser_open: bool,
}

impl State for DropdownState {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

fn chip(ui: &mut Ui, name: &str) {
    ui.label(
        RichText::new(name)
            .small()
            .background_color(ui.visuals().faint_bg_color),
    );
}

/// Selection chips plus a checkbox dropdown. Every click on a row toggles
/// the id in the entry's tag set; selected ids the directory no longer knows
/// render no chip.
pub fn tag_selector(
    input: &mut NewstreamInput,
    directory: &TagDirectoryCompute,
    open: &mut bool,
    ui: &mut Ui,
) -> Response {
    let response = ui
        .vertical(|ui| {
            ui.horizontal_wrapped(|ui| {
                for id in &input.tags {
                    if let Some(tag) = directory.find(*id) {
                        chip(ui, tag.name());
                    }
                }

                let arrow = if *open { "▲" } else { "▼" };
                if ui.small_button(arrow).clicked() {
                    *open = !*open;
                }
            });

            if *open {
                Frame::group(ui.style()).show(ui, |ui| {
                    if directory.is_loading() {
                        ui.spinner();
                        return;
                    }

                    let tags = directory.tags();
                    if tags.is_empty() {
                        ui.weak("No tags loaded");
                        return;
                    }

                    for tag in tags {
                        let mut checked = input.has_tag(tag.id);
                        if ui.checkbox(&mut checked, tag.name()).clicked() {
                            input.toggle_tag(tag.id);
                        }
                    }
                });
            }
        })
        .response;

    // The toolkit's outside-interaction signal closes the dropdown.
    if *open && response.clicked_elsewhere() {
        *open = false;
    }

    response
}

/// Read-only variant for the tag form: chips filtered by the query string,
/// plus a plain list of every fetched tag when opened.
pub fn tag_browser(
    query: &str,
    directory: &TagDirectoryCompute,
    open: &mut bool,
    ui: &mut Ui,
) -> Response {
    let response = ui
        .vertical(|ui| {
            ui.horizontal_wrapped(|ui| {
                for tag in directory.matching(query) {
                    chip(ui, tag.name());
                }

                let arrow = if *open { "▲" } else { "▼" };
                if ui.small_button(arrow).clicked() {
                    *open = !*open;
                }
            });

            if *open {
                Frame::group(ui.style()).show(ui, |ui| {
                    for tag in directory.tags() {
                        ui.label(tag.name());
                    }
                });
            }
        })
        .response;

    if *open && response.clicked_elsewhere() {
        *open = false;
    }

    response
}
