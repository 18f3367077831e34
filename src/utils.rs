use std::collections::BTreeSet;

use crate::error::{FvmError, Result};

/// Largest collection [`power_set`] enumerates.
pub const MAX_POWER_SET_ELEMENTS: usize = 20;

/// [Power set][power-set] of a finite collection.
///
/// ```text
/// P({a, b}) = { {}, {a}, {b}, {a, b} }
/// ```
///
/// Subsets are produced in binary-counting order over the input order.
/// Fails with `UnsupportedComposition` beyond [`MAX_POWER_SET_ELEMENTS`] elements.
///
/// [power-set]: https://en.wikipedia.org/wiki/Power_set
pub fn power_set<T>(items: impl IntoIterator<Item = T>) -> Result<Vec<BTreeSet<T>>>
where
    T: Clone + Ord,
{
    let items: Vec<T> = items.into_iter().collect();
    if items.len() > MAX_POWER_SET_ELEMENTS {
        return Err(FvmError::UnsupportedComposition(format!(
            "power set of {} elements exceeds the limit of {}",
            items.len(),
            MAX_POWER_SET_ELEMENTS
        )));
    }
    Ok((0u32..(1 << items.len()))
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, x)| x.clone())
                .collect()
        })
        .collect())
}

/// Conjunction of two guard texts.
///
/// ```text
/// ("", g) -> g
/// (g, "") -> g
/// (g, h)  -> (g) && (h)
/// ```
pub fn conjoin(lhs: &str, rhs: &str) -> String {
    match (lhs.is_empty(), rhs.is_empty()) {
        (true, _) => rhs.to_string(),
        (_, true) => lhs.to_string(),
        _ => format!("({}) && ({})", lhs, rhs),
    }
}

/// Negation of a guard text. The empty guard is `true`, so its negation is `false`.
pub fn negate(guard: &str) -> String {
    if guard.is_empty() {
        "false".to_string()
    } else {
        format!("!({})", guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_set() {
        let ps = power_set(["a", "b", "c"]).unwrap();
        assert_eq!(ps.len(), 8);
        assert!(ps.contains(&BTreeSet::new()));
        assert!(ps.contains(&BTreeSet::from(["a", "c"])));
        assert!(ps.contains(&BTreeSet::from(["a", "b", "c"])));
    }

    #[test]
    fn test_power_set_empty() {
        let ps = power_set(Vec::<u8>::new()).unwrap();
        assert_eq!(ps, vec![BTreeSet::new()]);
    }

    #[test]
    fn test_power_set_too_large() {
        assert!(matches!(power_set(0..21u8), Err(FvmError::UnsupportedComposition(_))));
        assert!(matches!(power_set(0..32u8), Err(FvmError::UnsupportedComposition(_))));
    }

    #[test]
    fn test_conjoin() {
        assert_eq!(conjoin("", ""), "");
        assert_eq!(conjoin("x > 0", ""), "x > 0");
        assert_eq!(conjoin("", "y"), "y");
        assert_eq!(conjoin("x > 0", "y"), "(x > 0) && (y)");
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(""), "false");
        assert_eq!(negate("x == 1"), "!(x == 1)");
    }
}
