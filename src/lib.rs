pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod voting;

pub use config::{LookupMode, StoreConfig};
pub use db::VoteStore;
pub use error::{StoreError, StoreResult};
pub use models::{Ballot, Outcome, VoteRecord};
