//! Board state: data model, column ordering, filters, and the store.
//!
//! | Module      | Responsibility                                             |
//! |-------------|------------------------------------------------------------|
//! | `models`    | `Kanban`, `Product`, `ProductGroup`, `Item`, column sets   |
//! | `position`  | Per-column total order                                     |
//! | `aggregate` | Ordered column view (groups as units + loose products)     |
//! | `filter`    | `ProductFilter` and saved presets                          |
//! | `store`     | `BoardStore` handle, sequence tickets, change events       |

pub mod aggregate;
pub mod filter;
pub mod models;
pub mod position;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;
