//! Application services built on the repository and link traits.

pub mod context;
pub mod error;
pub mod fixture;
pub mod links;
pub mod listing;
pub mod menus;
pub mod modifier;
pub mod navigation;
pub mod pagination;
pub mod posts;
pub mod repos;

#[cfg(test)]
pub(crate) mod testing;
