mod atomic;
pub mod json_backend;

pub use json_backend::JsonStorage;
