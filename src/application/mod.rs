// src/application/mod.rs
pub mod error;
pub mod services;
pub mod view;

// Re-export key services for easier imports
pub use services::bookmark_service_impl::BookmarkServiceImpl;
pub use view::BookmarkView;
