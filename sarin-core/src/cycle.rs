use rand::Rng;

/// Round-robin over a list of alternatives, starting at a random index.
///
/// Every alternative is visited once before any repeats, while the start
/// position varies between construction sites (one cycle per field per
/// worker), so concurrent workers do not produce identical traffic
/// fingerprints.
pub struct Cycle<T> {
    items: Vec<T>,
    pos: usize,
}

impl<T> Cycle<T> {
    /// Panics if `items` is empty; callers guarantee at least one alternative.
    pub fn new<R: Rng>(items: Vec<T>, rng: &mut R) -> Self {
        assert!(!items.is_empty(), "cycle over empty alternatives");
        let pos = rng.random_range(0..items.len());
        Cycle { items, pos }
    }

    pub fn next(&mut self) -> &T {
        let idx = self.pos;
        self.pos = (self.pos + 1) % self.items.len();
        &self.items[idx]
    }
}
