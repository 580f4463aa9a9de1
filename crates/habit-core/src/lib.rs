pub mod chat;
pub mod claim;
pub mod coach;
pub mod config;
pub mod deal;
pub mod error;
pub mod io;
pub mod ledger;
pub mod paths;
pub mod session;
pub mod store;
pub mod timeline;
pub mod types;
pub mod vocab;

pub use error::{HabitError, Result};
