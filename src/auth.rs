//! Auth capability: token models, endpoint exchanges, and header factories.

pub mod exchange;
pub mod factory;
pub mod token;

pub use exchange::*;
pub use factory::*;
pub use token::*;
