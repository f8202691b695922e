/// Sequential id, unique within the allocator that issued it.
///
/// Ids compare in issue order, which is what the request sequencing in the
/// workflow crates relies on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u64);

impl Id {
    pub fn new(n: u64) -> Self {
        Id(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic id source. The first id issued is `Id(1)`.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> Id {
        self.last += 1;
        Id(self.last)
    }

    /// Most recently issued id, if any.
    pub fn last(&self) -> Option<Id> {
        (self.last > 0).then_some(Id(self.last))
    }

    pub fn is_latest(&self, id: Id) -> bool {
        self.last() == Some(id)
    }
}
