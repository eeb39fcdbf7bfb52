pub mod catalog;
pub mod dashboard;
pub mod employees;
pub mod sessions;
