//! Blog navigation: tag, archive, category and author menus built from the
//! post store, cached per locale and audience, and invalidated by post writes.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

pub(crate) mod util;
