pub mod date;
pub mod keys;
