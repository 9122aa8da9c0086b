pub mod intensity;
