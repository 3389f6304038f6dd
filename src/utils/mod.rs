pub mod errors;
pub mod page;
pub mod ratelimit;
pub mod table;

pub use table::Table;
