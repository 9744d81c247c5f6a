//! Platform tables and hooks. Only the browser target ships today.

pub mod web;
