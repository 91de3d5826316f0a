pub mod bbox;
pub mod dict;
pub mod header;
