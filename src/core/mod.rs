// Core utilities shared across engine modules

pub mod math;
