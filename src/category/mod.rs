//! Categories for grouping income and expenses.

mod db;
mod domain;

pub use db::{create_category, create_category_table, get_categories};
pub use domain::{Category, CategoryName};
