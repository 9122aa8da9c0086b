pub mod clips;
pub mod notes;
pub mod resample;
pub mod sequence;
