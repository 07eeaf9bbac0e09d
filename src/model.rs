pub mod bubble;
pub mod touch;
pub mod trash;
pub mod velocity;
