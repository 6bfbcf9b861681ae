// Core value types shared by every engine module

pub mod color;
pub mod math;

pub use color::Color;
