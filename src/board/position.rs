//! Total order of items within one column.
//!
//! Items with a `column_position` come first in ascending order; items
//! without one sort after them. Equal or missing positions fall back to
//! creation time, then to the id so the order is total even when two items
//! share a timestamp.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::models::{Product, ProductGroup};

/// Anything that occupies a slot in a column.
pub trait Positioned {
    fn column_position(&self) -> Option<i64>;
    fn created_at(&self) -> DateTime<Utc>;
    fn sort_id(&self) -> &str;
}

impl Positioned for Product {
    fn column_position(&self) -> Option<i64> {
        self.column_position
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn sort_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Positioned for ProductGroup {
    fn column_position(&self) -> Option<i64> {
        self.column_position
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn sort_id(&self) -> &str {
        self.id.as_str()
    }
}

pub fn compare<A, B>(a: &A, b: &B) -> Ordering
where
    A: Positioned + ?Sized,
    B: Positioned + ?Sized,
{
    let by_position = match (a.column_position(), b.column_position()) {
        (Some(pa), Some(pb)) => pa.cmp(&pb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_position
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.sort_id().cmp(b.sort_id()))
}

pub fn sort_column<T: Positioned>(items: &mut [T]) {
    items.sort_by(|a, b| compare(a, b));
}
