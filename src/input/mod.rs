pub mod actions;

pub use actions::{MapAction, ParseActionError};
