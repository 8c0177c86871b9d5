//! Ordering of test identifiers.
//!
//! Test ids are strings, but benchmark suites usually number their instances.
//! When every id in a collection parses as an integer the collection sorts
//! numerically (`2` before `10`); otherwise it sorts by bytes.
use std::cmp::Ordering;

/// Sorts `ids` ascending using the natural test order for that collection.
pub fn sort_test_ids<T: AsRef<str>>(ids: &mut [T]) {
    sort_by_test_key(ids, |id| id.as_ref());
}

/// Sorts `items` ascending by the test id `key` extracts, using the natural
/// test order for the whole collection. The sort is stable.
pub fn sort_by_test_key<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    let numeric = items.iter().all(|item| key(item).parse::<i64>().is_ok());
    if numeric {
        items.sort_by(|a, b| compare_numeric(key(a), key(b)));
    } else {
        items.sort_by(|a, b| key(a).cmp(key(b)));
    }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    if let (Ok(x), Ok(y)) = (a.parse::<i64>(), b.parse::<i64>()) {
        x.cmp(&y).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ids_sort_numerically() {
        let mut ids = vec!["10", "2", "1"];
        sort_test_ids(&mut ids);
        assert_eq!(ids, ["1", "2", "10"]);
    }

    #[test]
    fn mixed_ids_sort_by_bytes() {
        let mut ids = vec!["10", "2", "b", "A"];
        sort_test_ids(&mut ids);
        assert_eq!(ids, ["10", "2", "A", "b"]);
    }

    #[test]
    fn equal_numbers_tie_break_on_text() {
        let mut ids = vec!["007", "7", "-1"];
        sort_test_ids(&mut ids);
        assert_eq!(ids, ["-1", "007", "7"]);
    }
}
