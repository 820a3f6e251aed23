pub mod catalog;
pub mod history;
pub mod quotes;
pub mod ticker;
