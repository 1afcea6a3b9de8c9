#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod draft;
pub mod error;
pub mod event;
pub mod model;
pub mod record_store;
pub mod submission;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::EditorConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{AppError, AppResult, ErrorKind, ErrorSeverity};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;

/// Largest local image accepted from the image editor.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
