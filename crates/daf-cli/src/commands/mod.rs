pub mod expand;
pub mod merge;
pub mod page;
pub mod parse;
