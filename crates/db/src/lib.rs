mod pool;
mod schema;
pub mod table;

pub use pool::create_pool;
pub use schema::migrate;
