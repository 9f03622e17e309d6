pub(crate) mod exact;
pub(crate) mod permutations;
