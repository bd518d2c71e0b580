pub mod catalog;
pub mod chat;
pub mod common;
pub mod embedding;

pub use catalog::*;
pub use chat::*;
pub use common::*;
pub use embedding::*;
