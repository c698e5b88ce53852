//! Random numbers, a hand-written sort and even/odd averages.

use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;

pub const DEFAULT_COUNT: usize = 100;
pub const DEFAULT_RANGE: RangeInclusive<i64> = 0..=1000;

pub fn random_numbers(
    rng: &mut (impl Rng + ?Sized),
    count: usize,
    range: RangeInclusive<i64>,
) -> Vec<i64> {
    (0..count).map(|_| rng.random_range(range.clone())).collect()
}

/// In-place bubble sort, stopping early once a pass makes no swaps.
pub fn bubble_sort<T: Ord>(items: &mut [T]) {
    let n = items.len();
    for pass in 0..n {
        let mut swapped = false;
        for j in 0..n - pass - 1 {
            if items[j + 1] < items[j] {
                items.swap(j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

/// Split into `(even, odd)`, keeping relative order.
pub fn split_even_odd(numbers: &[i64]) -> (Vec<i64>, Vec<i64>) {
    numbers.iter().partition(|n| *n % 2 == 0)
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn average(numbers: &[i64]) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    numbers.iter().map(|n| *n as f64).sum::<f64>() / numbers.len() as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumbersReport {
    pub sorted: Vec<i64>,
    pub even: Vec<i64>,
    pub odd: Vec<i64>,
    pub even_average: f64,
    pub odd_average: f64,
}

impl NumbersReport {
    pub fn new(mut numbers: Vec<i64>) -> Self {
        bubble_sort(&mut numbers);
        let (even, odd) = split_even_odd(&numbers);
        Self {
            even_average: average(&even),
            odd_average: average(&odd),
            sorted: numbers,
            even,
            odd,
        }
    }
}

impl fmt::Display for NumbersReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total numbers: {}", self.sorted.len())?;
        writeln!(f, "Count of even numbers: {}", self.even.len())?;
        writeln!(f, "Average of even numbers: {:.2}", self.even_average)?;
        writeln!(f, "Count of odd numbers: {}", self.odd.len())?;
        write!(f, "Average of odd numbers: {:.2}", self.odd_average)?;
        if let (Some(min), Some(max)) = (self.sorted.first(), self.sorted.last()) {
            write!(f, "\nSmallest number: {min}\nLargest number: {max}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn sorts_small_inputs() {
        let mut empty: [i64; 0] = [];
        bubble_sort(&mut empty);

        let mut one = [5];
        bubble_sort(&mut one);
        assert_eq!(one, [5]);

        let mut v = vec![3, -1, 2, 2, 0];
        bubble_sort(&mut v);
        assert_eq!(v, [-1, 0, 2, 2, 3]);
    }

    #[test]
    fn even_odd_and_averages() {
        let (even, odd) = split_even_odd(&[1, 2, 3, 4, -5]);
        assert_eq!(even, [2, 4]);
        assert_eq!(odd, [1, 3, -5]);
        assert_eq!(average(&even), 3.0);
        assert_eq!(average(&[]), 0.0);
    }

    #[test]
    fn seeded_numbers_are_reproducible_and_in_range() {
        let a = random_numbers(&mut StdRng::seed_from_u64(42), DEFAULT_COUNT, DEFAULT_RANGE);
        let b = random_numbers(&mut StdRng::seed_from_u64(42), DEFAULT_COUNT, DEFAULT_RANGE);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        assert!(a.iter().all(|n| DEFAULT_RANGE.contains(n)));
    }

    #[test]
    fn report_on_all_odd() {
        let report = NumbersReport::new(vec![9, 1, 5]);
        assert_eq!(report.sorted, [1, 5, 9]);
        assert!(report.even.is_empty());
        assert_eq!(report.even_average, 0.0);
        assert_eq!(report.odd_average, 5.0);
        assert!(report.to_string().contains("Largest number: 9"));
    }

    proptest! {
        #[test]
        fn matches_std_sort(mut v in proptest::collection::vec(any::<i64>(), 0..64)) {
            let mut expected = v.clone();
            expected.sort();
            bubble_sort(&mut v);
            prop_assert_eq!(v, expected);
        }
    }
}
