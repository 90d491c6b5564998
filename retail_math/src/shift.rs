//! Positional shifts of a series

/// Value `n` positions earlier, `None` for the first `n` positions
pub fn lag(values: &[f64], n: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(n).map(|j| values[j]))
        .collect()
}

/// Value `n` positions later, `None` for the last `n` positions
pub fn lead(values: &[f64], n: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| values.get(i + n).copied())
        .collect()
}
