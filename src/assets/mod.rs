pub mod fetch;

pub use fetch::{FetchPromise, Fetched};
