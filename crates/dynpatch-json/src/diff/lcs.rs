//! Longest common subsequence alignment.
//!
//! Quadratic dynamic programming over the two inputs. Callers trim common
//! prefixes and suffixes first and bound the table size with a cell budget.

// ── Types ─────────────────────────────────────────────────────────────────

/// A run of unmatched elements between two matched anchors, as half-open
/// ranges into the old and new inputs. Either range may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub old_start: usize,
    pub old_end: usize,
    pub new_start: usize,
    pub new_end: usize,
}

impl Gap {
    pub fn old_len(&self) -> usize {
        self.old_end - self.old_start
    }

    pub fn new_len(&self) -> usize {
        self.new_end - self.new_start
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Common prefix length.
pub fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Common suffix length.
pub fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

/// Matched index pairs `(i, j)` with `a[i] == b[j]`, strictly increasing in
/// both components, forming a longest common subsequence.
///
/// Returns `None` when `a.len() * b.len()` exceeds `max_cells`.
pub fn lcs_pairs<T: PartialEq>(a: &[T], b: &[T], max_cells: usize) -> Option<Vec<(usize, usize)>> {
    let (n, m) = (a.len(), b.len());
    if n.checked_mul(m)? > max_cells {
        return None;
    }
    if n == 0 || m == 0 {
        return Some(Vec::new());
    }
    // table[i * (m + 1) + j] = LCS length of a[i..] and b[j..]
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }
    let mut pairs = Vec::with_capacity(table[0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    Some(pairs)
}

/// The non-empty unmatched gaps around `pairs`, left to right.
pub fn gaps(pairs: &[(usize, usize)], old_len: usize, new_len: usize) -> Vec<Gap> {
    let mut out = Vec::with_capacity(pairs.len() + 1);
    let (mut old_start, mut new_start) = (0, 0);
    for &(i, j) in pairs.iter().chain(std::iter::once(&(old_len, new_len))) {
        if i > old_start || j > new_start {
            out.push(Gap { old_start, old_end: i, new_start, new_end: j });
        }
        old_start = i + 1;
        new_start = j + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcs_of_shifted_sequences() {
        let a = [2, 3, 4];
        let b = [3, 4, 5];
        assert_eq!(lcs_pairs(&a, &b, 100), Some(vec![(1, 0), (2, 1)]));
    }

    #[test]
    fn lcs_budget() {
        let a = [1, 2, 3];
        assert_eq!(lcs_pairs(&a, &a, 8), None);
        assert!(lcs_pairs(&a, &a, 9).is_some());
        assert_eq!(lcs_pairs::<i32>(&[], &a, 0), Some(vec![]));
    }

    #[test]
    fn lcs_is_longest() {
        let a: Vec<char> = "ABCBDAB".chars().collect();
        let b: Vec<char> = "BDCABA".chars().collect();
        let pairs = lcs_pairs(&a, &b, 1000).unwrap();
        assert_eq!(pairs.len(), 4);
        assert!(pairs.iter().all(|&(i, j)| a[i] == b[j]));
        assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
    }

    #[test]
    fn gaps_between_anchors() {
        let g = gaps(&[(1, 0), (2, 1)], 3, 3);
        assert_eq!(
            g,
            vec![
                Gap { old_start: 0, old_end: 1, new_start: 0, new_end: 0 },
                Gap { old_start: 3, old_end: 3, new_start: 2, new_end: 3 },
            ]
        );
        assert_eq!(gaps(&[], 2, 1), vec![Gap { old_start: 0, old_end: 2, new_start: 0, new_end: 1 }]);
        assert!(gaps(&[(0, 0)], 1, 1).is_empty());
    }

    #[test]
    fn affixes() {
        assert_eq!(common_prefix(&[1, 2, 3], &[1, 2, 4]), 2);
        assert_eq!(common_suffix(&[1, 2, 3], &[0, 3]), 1);
    }
}
