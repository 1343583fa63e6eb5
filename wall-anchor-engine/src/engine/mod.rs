pub mod core;
pub mod geometry;
pub mod scene;
