#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}
