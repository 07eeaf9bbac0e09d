pub mod touch;
pub mod trash;
