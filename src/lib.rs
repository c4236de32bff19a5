//! Depth-bounded crawler: walks same-origin links from a seed page into a
//! tree, or searches the reachable pages for keywords.

pub mod config;
pub mod crawler;
