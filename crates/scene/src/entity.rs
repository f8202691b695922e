use foundation::ids::Id;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub Id);

impl NodeId {
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}
