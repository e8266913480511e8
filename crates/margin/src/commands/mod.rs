pub mod build;
pub mod highlight;
pub mod render;
