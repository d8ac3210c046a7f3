mod identifier;
mod layout;

pub use identifier::*;
