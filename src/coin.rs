use rand::{Rng, RngCore};

/// The biased coin behind every balance decision.
///
/// For a node with `n` slots, [`Coin::flip`] succeeds with probability
/// `balance^n`: an empty node always takes a flat leaf, and every extra slot
/// makes nesting geometrically more likely.
#[derive(Debug, Clone)]
pub(crate) struct Coin<R> {
    balance: f64,
    rng: R,
}

impl<R: RngCore> Coin<R> {
    /// `balance` must already be validated to lie within `(0, 1]`.
    pub(crate) fn new(balance: f64, rng: R) -> Self {
        debug_assert!(balance > 0.0 && balance <= 1.0, "unvalidated balance {balance}");
        Self { balance, rng }
    }

    pub(crate) fn balance(&self) -> f64 {
        self.balance
    }

    pub(crate) fn chance(&self, slots: usize) -> f64 {
        self.balance.powi(i32::try_from(slots).unwrap_or(i32::MAX))
    }

    pub(crate) fn flip(&mut self, slots: usize) -> bool {
        let chance = self.chance(slots);
        self.rng.gen_bool(chance)
    }
}
