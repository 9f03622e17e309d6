use std::collections::BTreeMap;

/// Binary variable "node occupies tour position `position`".
///
/// Flattened as `position * n + node`, matching the layout of sampler assignments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub node: usize,
    pub position: usize,
}

impl Variable {
    pub fn new(node: usize, position: usize) -> Self {
        Self { node, position }
    }

    pub fn index(self, n: usize) -> usize {
        self.position * n + self.node
    }

    pub fn from_index(idx: usize, n: usize) -> Self {
        Self {
            node: idx % n,
            position: idx / n,
        }
    }
}

/// Sparse upper-triangular QUBO coefficients keyed by unordered variable pairs.
///
/// Keys are stored as `(low, high)`; a coefficient added for `(b, a)` lands on
/// `(a, b)`. Absent keys are zero. Diagonal keys hold the linear bias of a variable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuboMatrix {
    num_variables: usize,
    terms: BTreeMap<(usize, usize), f64>,
}

impl QuboMatrix {
    pub fn new(num_variables: usize) -> Self {
        Self {
            num_variables,
            terms: BTreeMap::new(),
        }
    }

    /// Accumulates `delta` onto the coefficient of `{a, b}`.
    pub fn add(&mut self, a: usize, b: usize, delta: f64) {
        let key = (a.min(b), a.max(b));
        self.num_variables = self.num_variables.max(key.1 + 1);
        *self.terms.entry(key).or_insert(0.0) += delta;
    }

    pub fn add_pair(&mut self, a: Variable, b: Variable, n: usize, delta: f64) {
        self.add(a.index(n), b.index(n), delta);
    }

    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.terms
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn linear(&self, a: usize) -> f64 {
        self.get(a, a)
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Number of stored coefficients.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficients in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.terms.iter().map(|(&key, &value)| (key, value))
    }

    /// `Σ Q[a,b]·x_a·x_b`; a diagonal term contributes `Q[a,a]·x_a`.
    /// Variables beyond the end of `assignment` count as 0.
    pub fn energy(&self, assignment: &[bool]) -> f64 {
        let bit = |i: usize| assignment.get(i).copied().unwrap_or(false);
        self.terms
            .iter()
            .filter(|((a, b), _)| bit(*a) && bit(*b))
            .map(|(_, value)| value)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{QuboMatrix, Variable};

    #[test]
    fn add_accumulates_on_unordered_keys() {
        let mut q = QuboMatrix::new(3);
        q.add(2, 0, 1.5);
        q.add(0, 2, 1.0);
        q.add(1, 1, -3.0);
        assert_eq!(q.get(0, 2), 2.5);
        assert_eq!(q.get(2, 0), 2.5);
        assert_eq!(q.linear(1), -3.0);
        assert_eq!(q.get(0, 1), 0.0);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn add_grows_variable_count() {
        let mut q = QuboMatrix::default();
        q.add(0, 6, 1.0);
        assert_eq!(q.num_variables(), 7);
    }

    #[test]
    fn energy_counts_linear_and_pairwise_terms() {
        let mut q = QuboMatrix::new(3);
        q.add(0, 0, -1.0);
        q.add(1, 1, -2.0);
        q.add(0, 1, 5.0);
        q.add(1, 2, 7.0);
        assert_eq!(q.energy(&[true, false, false]), -1.0);
        assert_eq!(q.energy(&[true, true, false]), 2.0);
        assert_eq!(q.energy(&[false, true, true]), 5.0);
        assert_eq!(q.energy(&[]), 0.0);
    }

    #[test]
    fn variable_index_is_position_major() {
        let v = Variable::new(2, 1);
        assert_eq!(v.index(4), 6);
        assert_eq!(Variable::from_index(6, 4), v);
    }
}
