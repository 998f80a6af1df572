pub mod binary;
pub mod convert;
pub mod structs;
