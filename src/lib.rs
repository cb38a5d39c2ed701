#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod http_log;

pub use app::HttpLogViewerApp;
