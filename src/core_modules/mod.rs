pub mod converter;
pub mod detector;
pub mod frame;
pub mod pixel;
pub mod resizer;
