pub mod serve;
pub mod train;
