pub mod cli;
pub mod due;
pub mod render;
