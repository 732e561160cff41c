pub mod assets;
pub mod index;
pub mod tracker;
