/// Cells currently glowing, in activation order. Membership is tracked per
/// cell so repeated activation is a no-op.
#[derive(Clone, Debug, Default)]
pub struct ActiveSet {
    order: Vec<usize>,
    member: Vec<bool>,
}

impl ActiveSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            member: vec![false; capacity],
        }
    }

    /// Returns true when `index` was not yet active
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= self.member.len() {
            self.member.resize(index + 1, false);
        }
        if self.member[index] {
            return false;
        }
        self.member[index] = true;
        self.order.push(index);
        true
    }

    pub fn contains(&self, index: usize) -> bool {
        self.member.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    /// Keeps the cells for which `keep` returns true, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let member = &mut self.member;
        self.order.retain(|&index| {
            let kept = keep(index);
            if !kept {
                member[index] = false;
            }
            kept
        });
    }

    /// Empties the set and resizes it for a lattice of `capacity` cells
    pub fn reset(&mut self, capacity: usize) {
        self.order.clear();
        self.member.clear();
        self.member.resize(capacity, false);
    }
}
