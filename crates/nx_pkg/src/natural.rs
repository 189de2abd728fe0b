//! Ordering for sibling names where numeric names compare by value.

use std::cmp::Ordering;

/// Compare two names, treating names that parse as 32 bit integers numerically.
///
/// Integer names sort before all other names. Two non-integer names compare by their
/// bytes. Integers of equal value but different spelling (`"01"` and `"1"`) are equal, so a
/// stable sort keeps them in their original order.
///
/// ```
/// use std::cmp::Ordering;
/// use nx_pkg::natural::natural_cmp;
///
/// assert_eq!(natural_cmp("2", "10"), Ordering::Less);
/// assert_eq!(natural_cmp("10", "a"), Ordering::Less);
/// assert_eq!(natural_cmp("b", "a"), Ordering::Greater);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<i32>(), b.parse::<i32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use pretty_assertions::assert_eq;

    use super::natural_cmp;

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(natural_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "2"), Ordering::Greater);
        assert_eq!(natural_cmp("-5", "3"), Ordering::Less);
        assert_eq!(natural_cmp("7", "7"), Ordering::Equal);
    }

    #[test]
    fn numbers_sort_before_text() {
        assert_eq!(natural_cmp("999", "0a"), Ordering::Less);
        assert_eq!(natural_cmp("info", "0"), Ordering::Greater);
    }

    #[test]
    fn text_compares_by_bytes() {
        assert_eq!(natural_cmp("B", "a"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn equal_values_keep_input_order() {
        assert_eq!(natural_cmp("01", "1"), Ordering::Equal);

        let mut names = vec!["1", "01", "+1", "0"];
        names.sort_by(|a, b| natural_cmp(a, b));

        assert_eq!(names, vec!["0", "1", "01", "+1"]);
    }

    #[test]
    fn out_of_range_numbers_are_text() {
        assert_eq!(natural_cmp("99999999999", "1"), Ordering::Greater);
    }

    #[test]
    fn sorting_mixed_names() {
        let mut names = vec!["10", "icon", "2", "1", "effect", "0"];
        names.sort_by(|a, b| natural_cmp(a, b));

        assert_eq!(names, vec!["0", "1", "2", "10", "effect", "icon"]);
    }
}
