pub mod actions;
pub mod animation;
pub mod app;
pub mod book;
pub mod event_source;
pub mod gesture;
pub mod layout;
pub mod model;
pub mod narration;
pub mod navigator;
pub mod panic_handler;
pub mod progress;
pub mod reader;
pub mod selection;
pub mod settings;

pub mod test_utils;

pub use app::{App, run_app_with_event_source};
pub use reader::{Reader, ReaderHost};
