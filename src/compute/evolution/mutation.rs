//! Genetic operators: per-node mutation and subtree crossover.

use std::sync::Arc;

use rand::prelude::*;

use crate::ast::{
    BinaryOp, Mutator, Node, NodeRef, UnaryOp, rebuild_binary, rebuild_ternary, rebuild_unary,
};
use crate::compute::{IndexError, node_at};
use crate::schema::MutationRates;

use super::generator::TreeGenerator;

/// Errors raised by [`GeneticMutator::mutate_with_crossover`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("Tree sizes must be positive (first: {first_size}, donor: {donor_size})")]
    InvalidSize { first_size: usize, donor_size: usize },
    #[error("Crossover lookup failed: {0}")]
    Index(#[from] IndexError),
}

/// Randomly rewrites a tree, occasionally splicing in subtrees of a donor.
///
/// Every node first rolls for crossover with probability
/// `rates.crossover / first_size`, then for its kind-specific rule, then for
/// a full replacement by a fresh random tree. The first rule that fires
/// decides the node; otherwise the children are visited.
pub struct GeneticMutator<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
    rates: &'a MutationRates,
    generator: TreeGenerator,
    crossover_probability: f64,
    donor: Option<(NodeRef, usize)>,
    error: Option<IndexError>,
}

impl<'a, R: Rng + ?Sized> GeneticMutator<'a, R> {
    pub fn new(rng: &'a mut R, rates: &'a MutationRates) -> Self {
        Self {
            rng,
            rates,
            generator: TreeGenerator::new(rates.full_mutation_depth),
            crossover_probability: 0.0,
            donor: None,
            error: None,
        }
    }

    /// Use a custom generator for full mutations.
    pub fn with_generator(mut self, generator: TreeGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Mutate `first`, drawing crossover material from `donor`.
    ///
    /// Sizes are the node counts recorded for each tree; the donor size
    /// bounds the crossover index, so it must not exceed the donor's real
    /// node count.
    pub fn mutate_with_crossover(
        &mut self,
        first: &NodeRef,
        first_size: usize,
        donor: &NodeRef,
        donor_size: usize,
    ) -> Result<NodeRef, MutationError> {
        if first_size == 0 || donor_size == 0 {
            return Err(MutationError::InvalidSize {
                first_size,
                donor_size,
            });
        }
        self.crossover_probability = self.rates.crossover / first_size as f64;
        self.donor = Some((Arc::clone(donor), donor_size));
        self.error = None;

        let mutated = self.mutate(first);

        self.donor = None;
        match self.error.take() {
            Some(err) => Err(err.into()),
            None => Ok(mutated),
        }
    }

    #[inline]
    fn roll(&mut self, probability: f64) -> bool {
        self.rng.r#gen::<f64>() < probability
    }

    /// Pick the donor subtree at a uniform 1-based index.
    fn crossover(&mut self, node: &NodeRef) -> NodeRef {
        let Some((donor, donor_size)) = self.donor.as_ref() else {
            return Arc::clone(node);
        };
        let index = self.rng.gen_range(1..=*donor_size);
        match node_at(donor, index) {
            Ok(subtree) => subtree,
            Err(err) => {
                self.error.get_or_insert(err);
                Arc::clone(node)
            }
        }
    }

    fn full_mutation(&mut self) -> NodeRef {
        self.generator.generate(&mut *self.rng).node
    }

    fn try_crossover(&mut self, node: &NodeRef) -> Option<NodeRef> {
        if self.donor.is_some() && self.roll(self.crossover_probability) {
            Some(self.crossover(node))
        } else {
            None
        }
    }

    fn try_full_mutation(&mut self) -> Option<NodeRef> {
        if self.roll(self.rates.full_mutation) {
            Some(self.full_mutation())
        } else {
            None
        }
    }
}

impl<R: Rng + ?Sized> Mutator for GeneticMutator<'_, R> {
    fn mutate_constant(&mut self, node: &NodeRef, _value: f64) -> NodeRef {
        if let Some(crossed) = self.try_crossover(node) {
            return crossed;
        }
        if self.roll(self.rates.constant) {
            return Node::constant(self.generator.random_constant(&mut *self.rng));
        }
        self.try_full_mutation().unwrap_or_else(|| Arc::clone(node))
    }

    fn mutate_identifier(&mut self, node: &NodeRef, name: &str) -> NodeRef {
        if let Some(crossed) = self.try_crossover(node) {
            return crossed;
        }
        if self.roll(self.rates.identifier) {
            return Node::identifier(if name == "x" { "y" } else { "x" });
        }
        self.try_full_mutation().unwrap_or_else(|| Arc::clone(node))
    }

    fn mutate_error(&mut self, node: &NodeRef, _message: &str) -> NodeRef {
        if let Some(crossed) = self.try_crossover(node) {
            return crossed;
        }
        self.try_full_mutation().unwrap_or_else(|| Arc::clone(node))
    }

    fn mutate_unary(&mut self, node: &NodeRef, op: UnaryOp, operand: &NodeRef) -> NodeRef {
        if let Some(crossed) = self.try_crossover(node) {
            return crossed;
        }
        // Negation has no sibling operator, so a same-family swap drops it.
        if self.roll(self.rates.same_family) {
            return self.mutate(operand);
        }
        if let Some(fresh) = self.try_full_mutation() {
            return fresh;
        }
        rebuild_unary(self, node, op, operand)
    }

    fn mutate_binary(
        &mut self,
        node: &NodeRef,
        op: BinaryOp,
        left: &NodeRef,
        right: &NodeRef,
    ) -> NodeRef {
        if let Some(crossed) = self.try_crossover(node) {
            return crossed;
        }
        if self.roll(self.rates.same_family) {
            let left = self.mutate(left);
            let right = self.mutate(right);
            return Node::binary(op.sibling(), left, right);
        }
        if self.roll(self.rates.cross_family) {
            let left = self.mutate(left);
            let right = self.mutate(right);
            let candidates = op.family().opposite().operators();
            let swapped = candidates[self.rng.gen_range(0..candidates.len())];
            return Node::binary(swapped, left, right);
        }
        if let Some(fresh) = self.try_full_mutation() {
            return fresh;
        }
        rebuild_binary(self, node, op, left, right)
    }

    fn mutate_ternary(
        &mut self,
        node: &NodeRef,
        condition: &NodeRef,
        when_true: &NodeRef,
        when_false: Option<&NodeRef>,
    ) -> NodeRef {
        if let Some(crossed) = self.try_crossover(node) {
            return crossed;
        }
        if let Some(when_false) = when_false
            && self.roll(self.rates.branch_swap)
        {
            let condition = self.mutate(condition);
            let swapped_true = self.mutate(when_false);
            let swapped_false = self.mutate(when_true);
            return Node::ternary(condition, swapped_true, Some(swapped_false));
        }
        if let Some(fresh) = self.try_full_mutation() {
            return fresh;
        }
        rebuild_ternary(self, node, condition, when_true, when_false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use crate::compute::node_count;

    fn tree(source: &str) -> NodeRef {
        parse(source).unwrap().unwrap()
    }

    fn mutate_once(source: &str, rates: &MutationRates, seed: u64) -> NodeRef {
        let first = tree(source);
        let size = node_count(&first);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut mutator = GeneticMutator::new(&mut rng, rates);
        mutator
            .mutate_with_crossover(&first, size, &first, size)
            .unwrap()
    }

    #[test]
    fn test_disabled_rates_preserve_identity() {
        let first = tree("(x * y) + (x ? -y : 2.5)");
        let size = node_count(&first);
        let rates = MutationRates::disabled();
        let mut rng = StdRng::seed_from_u64(1);
        let mut mutator = GeneticMutator::new(&mut rng, &rates);
        let mutated = mutator
            .mutate_with_crossover(&first, size, &first, size)
            .unwrap();
        assert!(Arc::ptr_eq(&mutated, &first));
    }

    #[test]
    fn test_identifier_flip() {
        let rates = MutationRates {
            identifier: 1.0,
            ..MutationRates::disabled()
        };
        assert_eq!(mutate_once("x + y", &rates, 0).canonical(), "( y + x )");
    }

    #[test]
    fn test_same_family_swap() {
        let rates = MutationRates {
            same_family: 1.0,
            ..MutationRates::disabled()
        };
        assert_eq!(mutate_once("x + y", &rates, 0).canonical(), "( x - y )");
        assert_eq!(
            mutate_once("(x * y) / 2", &rates, 0).canonical(),
            "( ( x / y ) * 2 )"
        );
        assert_eq!(mutate_once("-(-x)", &rates, 0).canonical(), "x");
    }

    #[test]
    fn test_cross_family_swap() {
        let rates = MutationRates {
            cross_family: 1.0,
            ..MutationRates::disabled()
        };
        for seed in 0..20 {
            match &*mutate_once("x + y", &rates, seed) {
                Node::Binary { op, .. } => {
                    assert!(matches!(op, BinaryOp::Multiply | BinaryOp::Divide))
                }
                other => panic!("unexpected node {other}"),
            }
            match &*mutate_once("x / y", &rates, seed) {
                Node::Binary { op, .. } => {
                    assert!(matches!(op, BinaryOp::Add | BinaryOp::Subtract))
                }
                other => panic!("unexpected node {other}"),
            }
        }
    }

    #[test]
    fn test_branch_swap() {
        let rates = MutationRates {
            branch_swap: 1.0,
            ..MutationRates::disabled()
        };
        assert_eq!(
            mutate_once("x ? 1 : 2", &rates, 0).canonical(),
            "( x ? 2 : 1 )"
        );
        let guarded = tree("x ? 1");
        let mutated = mutate_once("x ? 1", &rates, 0);
        assert!(crate::ast::same_structure(&guarded, &mutated));
    }

    #[test]
    fn test_constant_replacement() {
        let rates = MutationRates {
            constant: 1.0,
            ..MutationRates::disabled()
        };
        let mutated = mutate_once("0.25 + 0.5", &rates, 9);
        match &*mutated {
            Node::Binary { left, right, .. } => {
                assert_ne!(left.as_constant(), Some(0.25));
                assert_ne!(right.as_constant(), Some(0.5));
            }
            other => panic!("unexpected node {other}"),
        }
    }

    #[test]
    fn test_full_mutation_replaces_root() {
        let rates = MutationRates {
            full_mutation: 1.0,
            ..MutationRates::disabled()
        };
        let first = tree("x");
        let mut rng = StdRng::seed_from_u64(4);
        let mut mutator = GeneticMutator::new(&mut rng, &rates);
        let mutated = mutator.mutate_with_crossover(&first, 1, &first, 1).unwrap();
        assert!(!Arc::ptr_eq(&mutated, &first));
    }

    #[test]
    fn test_crossover_takes_donor_subtree() {
        let first = tree("x + y");
        let donor = tree("(2 * 3.5) - y");
        let donor_size = node_count(&donor);
        let rates = MutationRates {
            crossover: 3.0,
            ..MutationRates::disabled()
        };
        let subtrees: Vec<String> = (1..=donor_size)
            .map(|i| node_at(&donor, i).unwrap().canonical())
            .collect();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut mutator = GeneticMutator::new(&mut rng, &rates);
            // Crossover probability is 3 / 3, so the root is always replaced.
            let mutated = mutator
                .mutate_with_crossover(&first, 3, &donor, donor_size)
                .unwrap();
            assert!(subtrees.contains(&mutated.canonical()));
        }
    }

    #[test]
    fn test_crossover_takes_precedence_over_kind_rule() {
        let first = tree("x + y");
        let donor = tree("(2 * 3.5) - 4");
        let donor_size = node_count(&donor);
        let rates = MutationRates {
            crossover: 3.0,
            identifier: 1.0,
            ..MutationRates::disabled()
        };
        let subtrees: Vec<String> = (1..=donor_size)
            .map(|i| node_at(&donor, i).unwrap().canonical())
            .collect();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut mutator = GeneticMutator::new(&mut rng, &rates);
            let mutated = mutator
                .mutate_with_crossover(&first, 3, &donor, donor_size)
                .unwrap();
            let rendered = mutated.canonical();
            assert!(subtrees.contains(&rendered), "{rendered}");
            assert!(!rendered.contains('x') && !rendered.contains('y'));
        }
    }

    #[test]
    fn test_kind_rule_takes_precedence_over_full_mutation() {
        let rates = MutationRates {
            constant: 1.0,
            full_mutation: 1.0,
            ..MutationRates::disabled()
        };
        for seed in 0..50 {
            match &*mutate_once("0.25", &rates, seed) {
                Node::Constant(value) => assert_ne!(*value, 0.25),
                other => panic!("unexpected node {other}"),
            }
        }
    }

    #[test]
    fn test_invalid_sizes() {
        let first = tree("x");
        let rates = MutationRates::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut mutator = GeneticMutator::new(&mut rng, &rates);
        assert!(matches!(
            mutator.mutate_with_crossover(&first, 0, &first, 1),
            Err(MutationError::InvalidSize { .. })
        ));
        assert!(matches!(
            mutator.mutate_with_crossover(&first, 1, &first, 0),
            Err(MutationError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_oversized_donor_reports_index_error() {
        let first = tree("x");
        let rates = MutationRates {
            crossover: 1.0,
            ..MutationRates::disabled()
        };
        let failed = (0..20).any(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut mutator = GeneticMutator::new(&mut rng, &rates);
            matches!(
                mutator.mutate_with_crossover(&first, 1, &first, 1000),
                Err(MutationError::Index(IndexError::OutOfRange { .. }))
            )
        });
        assert!(failed);
    }
}
