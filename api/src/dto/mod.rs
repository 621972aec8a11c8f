pub mod keys;
pub mod token;

pub use keys::*;
pub use token::*;
