pub mod finish;
pub mod mapping;
pub mod tone;
