//! Flutter-facing bindings for quotebook core.

pub mod api;
