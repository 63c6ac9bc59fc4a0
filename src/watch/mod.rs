pub mod model;
pub mod repository;
pub mod repository_sqlx;

pub use model::{Watch, WatchPatch};
