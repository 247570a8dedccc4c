//! TUI module for Taskboard
//!
//! Provides an interactive terminal dashboard for Taskboard tasks using
//! ratatui and crossterm: sign-in, a reorderable task list with search,
//! filters and pagination, and the admin panel.

pub mod app;
pub mod data;
pub mod details;
pub mod error;
pub mod event;
pub mod form;
pub mod task_list;
pub mod ui;

pub use app::App;
pub use data::{ApiEvent, Backend, Requests};
pub use error::{TuiError, TuiResult};
