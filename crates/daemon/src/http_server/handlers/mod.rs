mod not_found;

pub use not_found::{method_not_allowed, not_found_handler};
