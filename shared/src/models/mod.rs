pub mod fractal;
pub mod fragments;
