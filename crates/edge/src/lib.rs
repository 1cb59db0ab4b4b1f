pub mod cli;
pub mod settings;
pub mod sweeper;

mod error;

pub use error::Error;
