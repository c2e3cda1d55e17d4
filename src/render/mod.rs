mod canvas;
mod color;
mod font;

pub use canvas::{Canvas, Rect};
pub use color::Color;
pub use font::Font;
