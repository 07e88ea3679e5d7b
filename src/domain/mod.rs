// src/domain/mod.rs
pub mod bookmark;
pub mod change_feed;
pub mod error;
pub mod event;
pub mod identity;
pub mod repositories;
pub mod url;
