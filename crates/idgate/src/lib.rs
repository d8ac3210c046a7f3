#![doc = include_str!("../README.md")]

mod error;
mod generator;
mod id;
mod node;
mod time;
mod token;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::node::*;
pub use crate::time::*;
pub use crate::token::*;
