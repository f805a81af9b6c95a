//! Expense categories.

mod core;
mod create_endpoint;
mod list_endpoint;

pub use self::core::{
    Category, CategoryName, NewCategory, create_category, create_category_table,
    get_active_categories,
};
pub use create_endpoint::create_category_endpoint;
pub use list_endpoint::{CategoryState, list_categories_endpoint};
