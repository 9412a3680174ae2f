pub mod service;

pub use service::{CommandError, CommandQueue};
