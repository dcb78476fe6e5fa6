pub mod rate;
pub mod scroll;
