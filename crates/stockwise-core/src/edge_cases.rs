//! # Edge-Case Normalizers
//!
//! Total functions that coerce messy input into something usable. None of
//! them fail: every path ends in either the cleaned value or the default.
//!
//! The retrying stock-update normalizer needs a timer, so it lives in
//! `stockwise-runtime::retry`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{self, format_date, parse_date};
use crate::types::FieldValue;

/// Rows per page when the caller does not choose.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Returns `default` for a missing or empty collection, else the data unchanged.
pub fn handle_empty_data<T>(data: Option<Vec<T>>, default: Vec<T>) -> Vec<T> {
    match data {
        Some(items) if !items.is_empty() => items,
        _ => default,
    }
}

/// Normalizes a date to `YYYY-MM-DD`, falling back to today.
pub fn handle_date_edge_cases(value: Option<&FieldValue>) -> String {
    handle_date_edge_cases_on(value, dates::today())
}

/// [`handle_date_edge_cases`] with an explicit "today".
pub fn handle_date_edge_cases_on(value: Option<&FieldValue>, today: NaiveDate) -> String {
    let parsed = match value {
        Some(FieldValue::Text(raw)) => parse_date(raw),
        _ => None,
    };
    format_date(parsed.unwrap_or(today))
}

/// Parses a finite number, falling back to `default`.
pub fn handle_numeric_edge_cases(value: Option<&FieldValue>, default: f64) -> f64 {
    value.and_then(FieldValue::as_number).unwrap_or(default)
}

/// A dataset split into pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedData<T> {
    pub pages: Vec<Vec<T>>,
    pub total_pages: usize,
}

impl<T> PagedData<T> {
    pub fn empty() -> Self {
        PagedData {
            pages: Vec::new(),
            total_pages: 0,
        }
    }
}

/// Splits rows into pages of at most `page_size`, preserving order.
///
/// `None` yields no pages. A `page_size` of zero is treated as one.
pub fn handle_large_dataset<T: Clone>(data: Option<&[T]>, page_size: usize) -> PagedData<T> {
    let Some(rows) = data else {
        return PagedData::empty();
    };

    let pages: Vec<Vec<T>> = rows
        .chunks(page_size.max(1))
        .map(<[T]>::to_vec)
        .collect();

    PagedData {
        total_pages: pages.len(),
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_handle_empty_data() {
        assert_eq!(handle_empty_data::<i32>(None, vec![0]), vec![0]);
        assert_eq!(handle_empty_data(Some(vec![]), vec![9]), vec![9]);
        assert_eq!(handle_empty_data(Some(vec![1, 2]), vec![9]), vec![1, 2]);
    }

    #[test]
    fn test_handle_date_edge_cases() {
        let today = ymd(2024, 6, 1);
        let value = FieldValue::from("2024-01-15");
        assert_eq!(handle_date_edge_cases_on(Some(&value), today), "2024-01-15");
        assert_eq!(handle_date_edge_cases_on(None, today), "2024-06-01");
        assert_eq!(
            handle_date_edge_cases_on(Some(&FieldValue::from("garbage")), today),
            "2024-06-01"
        );
    }

    #[test]
    fn test_handle_date_edge_cases_defaults_to_real_today() {
        assert_eq!(handle_date_edge_cases(None), format_date(dates::today()));
    }

    #[test]
    fn test_handle_numeric_edge_cases() {
        assert_eq!(handle_numeric_edge_cases(Some(&FieldValue::from("12.5")), 0.0), 12.5);
        assert_eq!(handle_numeric_edge_cases(Some(&FieldValue::from("abc")), 7.0), 7.0);
        assert_eq!(handle_numeric_edge_cases(Some(&FieldValue::from("NaN")), 1.0), 1.0);
        assert_eq!(handle_numeric_edge_cases(None, 3.0), 3.0);
    }

    #[test]
    fn test_handle_large_dataset() {
        let rows: Vec<u32> = (0..250).collect();
        let paged = handle_large_dataset(Some(rows.as_slice()), DEFAULT_PAGE_SIZE);
        assert_eq!(paged.total_pages, 3);
        assert_eq!(paged.pages[0].len(), 100);
        assert_eq!(paged.pages[2].len(), 50);
        assert_eq!(paged.pages[2][0], 200);
    }

    #[test]
    fn test_handle_large_dataset_edges() {
        assert_eq!(handle_large_dataset::<u32>(None, 10), PagedData::empty());

        let empty: Vec<u32> = Vec::new();
        assert_eq!(handle_large_dataset(Some(empty.as_slice()), 10).total_pages, 0);

        let rows = vec![1, 2, 3];
        assert_eq!(handle_large_dataset(Some(rows.as_slice()), 0).total_pages, 3);
    }
}
