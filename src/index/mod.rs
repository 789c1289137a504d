pub mod posting;
pub mod projection;
pub mod inverted;
pub mod search_index;
