use crate::RandSource;

/// A fixed-capacity cache with random-slot eviction.
///
/// The cache holds exactly `N` slots, each either empty or occupied.
/// Writes target a single slot and overwrite it unconditionally — the
/// replacement policy selects the victim uniformly at random over all
/// slots, irrespective of age or occupancy, so an insert may land on a
/// never-populated slot just as well as on live data. Evicted contents
/// are lost with no notification.
///
/// Occupancy is tracked explicitly so that "pick an occupied slot" is a
/// bounded operation: the empty-cache case is an explicit `None` rather
/// than an unbounded resampling loop.
#[derive(Debug)]
pub struct SlotCache<T, const N: usize> {
    slots: [Option<T>; N],
    occupied: usize,
}

impl<T, const N: usize> Default for SlotCache<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> SlotCache<T, N> {
    /// Creates a cache with all `N` slots empty.
    pub fn new() -> Self {
        Self {
            slots: [const { None }; N],
            occupied: 0,
        }
    }

    /// Number of slots, occupied or not.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of currently occupied slots.
    pub const fn occupied(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if no slot has ever been written.
    pub const fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Overwrites `slot` with `value`, returning the previous contents.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= N`.
    pub fn insert_at(&mut self, slot: usize, value: T) -> Option<T> {
        let prior = self.slots[slot].replace(value);
        if prior.is_none() {
            self.occupied += 1;
        }
        prior
    }

    /// Overwrites a uniformly random slot with `value`, returning the
    /// chosen slot index.
    pub fn insert_random<R: RandSource>(&mut self, rand: &mut R, value: T) -> usize {
        let slot = rand.uniform(N as u64) as usize;
        self.insert_at(slot, value);
        slot
    }

    /// Returns the contents of `slot`, if occupied.
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Selects one occupied slot uniformly at random.
    ///
    /// Selection is uniform over the *occupied* slots only, so this never
    /// resamples and never spins: with no occupied slot it returns `None`
    /// immediately.
    pub fn pick_occupied<R: RandSource>(&self, rand: &mut R) -> Option<(usize, &T)> {
        if self.occupied == 0 {
            return None;
        }
        let pick = rand.uniform(self.occupied as u64) as usize;
        self.iter().nth(pick)
    }

    /// Iterates the occupied slots in slot-index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }
}
