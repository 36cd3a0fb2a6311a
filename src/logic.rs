use itertools::Itertools;
use varisat::Lit;

/// Number of ways to choose `k` of `n`, saturating at [`usize::MAX`].
pub(crate) fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: usize = 1;
    for i in 0..k {
        // acc is C(n, i) here, so the division is exact
        acc = match acc.checked_mul(n - i) {
            Some(product) => product / (i + 1),
            None => return usize::MAX,
        };
    }
    acc
}

/// At least `k` of `lits` are true: every choice of `n - k + 1` literals contains a true one.
///
/// Asking for more than `lits.len()` yields the empty clause.
pub(crate) fn at_least(lits: &[Lit], k: usize) -> Vec<Vec<Lit>> {
    if k == 0 {
        return Vec::new();
    }
    if k > lits.len() {
        return vec![Vec::new()];
    }

    lits.iter()
        .copied()
        .combinations(lits.len() - k + 1)
        .collect_vec()
}

/// At most `k` of `lits` are true: every choice of `k + 1` literals contains a false one.
pub(crate) fn at_most(lits: &[Lit], k: usize) -> Vec<Vec<Lit>> {
    if k >= lits.len() {
        return Vec::new();
    }

    lits.iter()
        .combinations(k + 1)
        .map(|selection| selection.into_iter().map(|lit| !*lit).collect_vec())
        .collect_vec()
}

/// Exactly `k` of `lits` are true.
pub(crate) fn exactly(lits: &[Lit], k: usize) -> Vec<Vec<Lit>> {
    let mut clauses = at_least(lits, k);
    clauses.extend(at_most(lits, k));
    clauses
}

#[cfg(test)]
mod tests {
    use varisat::Var;

    use super::*;

    fn lits(n: usize) -> Vec<Lit> {
        (0..n).map(|index| Var::from_index(index).positive()).collect_vec()
    }

    fn count_true(mask: usize, n: usize) -> usize {
        (0..n).filter(|bit| mask & (1 << bit) != 0).count()
    }

    fn satisfied_by(clauses: &[Vec<Lit>], mask: usize) -> bool {
        clauses.iter().all(|clause| clause.iter()
            .any(|lit| (mask & (1 << lit.var().index()) != 0) == lit.is_positive()))
    }

    #[test]
    fn binomials() {
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(8, 4), 70);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(200, 100), usize::MAX);
    }

    #[test]
    fn exactly_k_accepts_exactly_k() {
        let n = 5;
        for k in 0..=n {
            let clauses = exactly(&lits(n), k);
            for mask in 0..(1 << n) {
                assert_eq!(satisfied_by(&clauses, mask), count_true(mask, n) == k, "k = {k}, mask = {mask:b}");
            }
        }
    }

    #[test]
    fn clause_counts() {
        assert_eq!(at_least(&lits(6), 4).len(), binomial(6, 3));
        assert_eq!(at_most(&lits(6), 4).len(), binomial(6, 5));
        assert!(at_most(&lits(3), 3).is_empty());
        assert!(at_least(&lits(3), 0).is_empty());
    }

    #[test]
    fn unreachable_requirement_is_a_contradiction() {
        assert_eq!(at_least(&lits(2), 3), vec![Vec::<Lit>::new()]);
        assert_eq!(at_least(&[], 1), vec![Vec::<Lit>::new()]);
    }
}
