mod app;
pub mod components;
pub(crate) mod key_handler;

pub use app::{render, App};
