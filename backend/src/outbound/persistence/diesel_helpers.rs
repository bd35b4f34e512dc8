//! Shared helpers for Diesel repository implementations.

use pagination::PageRequest;

use super::diesel_error_mapping::StoreFailure;

/// Convert a validated page request into SQL `OFFSET` and `LIMIT` values.
pub(crate) fn page_window(request: PageRequest) -> Result<(i64, i64), StoreFailure> {
    let offset = i64::try_from(request.offset())
        .map_err(|_| StoreFailure::Query(format!("offset {} out of range", request.offset())))?;
    Ok((offset, i64::from(request.page_size())))
}

/// Convert a SQL `COUNT(*)` into an unsigned total.
pub(crate) fn count_to_total(count: i64) -> Result<u64, StoreFailure> {
    u64::try_from(count).map_err(|_| StoreFailure::Query(format!("invalid row count {count}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagination::PageLimits;
    use rstest::rstest;

    #[rstest]
    fn window_matches_request() {
        let request = PageRequest::new(3, 20, PageLimits::default()).expect("valid");
        assert_eq!(page_window(request), Ok((60, 20)));
    }

    #[rstest]
    #[case(0, Some(0))]
    #[case(42, Some(42))]
    #[case(-1, None)]
    fn counts_convert_to_totals(#[case] count: i64, #[case] expected: Option<u64>) {
        assert_eq!(count_to_total(count).ok(), expected);
    }
}
