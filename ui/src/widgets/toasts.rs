//! Transient toast rendering over the notification queue.
//!
//! Each frame the widget drains newly pushed notices, keeps each one on
//! screen briefly, and anchors the stack to the bottom-right corner, newest
//! last.

use egui::{Align2, Area, Color32, Context, Frame, Id, Order};

use streams_business::notify::{self, Notice, NoticeLevel};

use super::newstream_form::{COLOR_GREEN, COLOR_ORANGE, COLOR_RED};

/// Seconds a notice stays visible.
const TOAST_SECONDS: f64 = 4.0;

#[derive(Default)]
pub struct ToastState {
    /// Visible notices with the frame time they appeared at.
    active: Vec<(Notice, f64)>,
}

fn level_color(level: NoticeLevel) -> Color32 {
    match level {
        NoticeLevel::Success => COLOR_GREEN,
        NoticeLevel::Warning => COLOR_ORANGE,
        NoticeLevel::Error => COLOR_RED,
    }
}

pub fn toasts(state: &mut ToastState, ctx: &Context) {
    let now = ctx.input(|i| i.time);

    for notice in notify::drain() {
        state.active.push((notice, now));
    }
    state
        .active
        .retain(|(_, shown_at)| now - *shown_at < TOAST_SECONDS);

    if state.active.is_empty() {
        return;
    }

    Area::new(Id::new("toasts"))
        .order(Order::Foreground)
        .anchor(Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .show(ctx, |ui| {
            for (notice, _) in &state.active {
                Frame::popup(ui.style()).show(ui, |ui| {
                    ui.colored_label(level_color(notice.level), &notice.message);
                });
            }
        });

    // Keep repainting so expired toasts disappear without input events.
    ctx.request_repaint_after(std::time::Duration::from_millis(250));
}

#[cfg(test)]
mod toast_tests {
    use egui_kittest::Harness;
    use kittest::Queryable;

    use streams_business::notify;

    #[test]
    fn drained_notices_are_rendered() {
        notify::error("ui-toast-test failure message");

        let mut state = super::ToastState::default();
        let harness = Harness::new_ui(move |ui| {
            super::toasts(&mut state, ui.ctx());
        });

        assert!(
            harness
                .query_by_label("ui-toast-test failure message")
                .is_some(),
            "pushed notice should appear as a toast"
        );
    }
}
