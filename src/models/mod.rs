pub mod item;
pub mod query;

pub use item::*;
pub use query::*;
