//! Count fetal kicks and keep a local history of how long ten kicks took.

pub mod config;
pub mod db;
pub mod display;
pub mod guide;
pub mod models;
pub mod store;
pub mod timer;
pub mod tui;
