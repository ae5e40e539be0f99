pub mod bridge;
pub mod sessions;
