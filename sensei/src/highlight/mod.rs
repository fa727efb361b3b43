//! Syntax highlighting for the editor panel.
//!
//! Highlighting a whole document with syntect is too slow for the keystroke
//! path, so it runs on a dedicated `std::thread` that owns the syntax and
//! theme sets. Requests go in over a crossbeam channel; styled lines come back
//! as `AppEvent::Highlighted`.
pub mod types;
pub mod worker;
