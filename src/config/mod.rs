pub mod schema;
pub mod storage;

pub use schema::*;
pub use storage::*;
