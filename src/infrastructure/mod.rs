pub mod di;
pub mod identity;
pub mod memory;
pub mod repositories;
