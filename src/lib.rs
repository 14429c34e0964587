//! Client-side ordering and transfer engine for inventory kanban boards.
//!
//! The engine keeps one board in a [`board::store::BoardStore`], applies every
//! change optimistically through [`sync::BoardController`], and reconciles or
//! rolls back once the REST backend ([`api::KanbanApi`]) answers. Drag
//! gestures are planned by [`drag`]; products entering a terminal column are
//! handed to another board by [`transfer`].

pub mod api;
pub mod board;
pub mod config;
pub mod drag;
pub mod errors;
pub mod logging;
pub mod notice;
pub mod sync;
pub mod transfer;
