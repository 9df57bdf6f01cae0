//! Tag selection expressions: `#a and (#b or not #c)` compiled into a
//! predicate over sets of tags.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod selector;
pub mod store;
pub mod tag;

#[cfg(test)]
mod tests;
