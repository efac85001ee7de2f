pub mod coordinate;
pub mod ride;
