/// Advances `order` to the next lexicographic permutation in place.
/// Returns `false` (leaving `order` untouched) once the last permutation was reached.
pub(crate) fn next_permutation(order: &mut [usize]) -> bool {
    let n = order.len();
    if n < 2 {
        return false;
    }

    let Some(pivot) = (0..n - 1).rev().find(|&i| order[i] < order[i + 1]) else {
        return false;
    };
    let Some(successor) = (pivot + 1..n).rev().find(|&j| order[j] > order[pivot]) else {
        return false;
    };
    order.swap(pivot, successor);
    order[pivot + 1..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::next_permutation;

    fn all_orders(n: usize) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..n).collect();
        let mut out = vec![order.clone()];
        while next_permutation(&mut order) {
            out.push(order.clone());
        }
        out
    }

    #[test]
    fn visits_orders_lexicographically() {
        assert_eq!(
            all_orders(3),
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
    }

    #[test]
    fn counts_factorial_orders() {
        assert_eq!(all_orders(5).len(), 120);
        assert_eq!(all_orders(1).len(), 1);
        assert_eq!(all_orders(0).len(), 1);
    }

    #[test]
    fn stops_at_descending_order() {
        let mut order = vec![2, 1, 0];
        assert!(!next_permutation(&mut order));
        assert_eq!(order, vec![2, 1, 0]);
    }
}
