pub mod index;
pub mod model;

pub use index::LinkIndex;
pub use model::{Link, LinkDirection};
