pub mod mine_offset;
pub mod overview;
