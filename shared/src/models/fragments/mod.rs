pub mod assignment;
pub mod completion;
pub mod messages;
pub mod row_blocks;
