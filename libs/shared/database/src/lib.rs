pub mod store;

pub use store::{eq_filter, TableStore};
