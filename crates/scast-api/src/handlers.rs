//! Request handlers.

pub mod health;
pub mod publish;

pub use health::*;
pub use publish::*;
