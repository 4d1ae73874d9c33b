mod build_info;
mod newstream_form;
mod tag_add_form;
mod tag_selector;
mod toasts;

pub use build_info::build_info;
pub use newstream_form::newstream_form;
pub use tag_add_form::tag_add_form;
pub use tag_selector::{DropdownState, tag_browser, tag_selector};
pub use toasts::{ToastState, toasts};
