pub mod chart;
pub mod pdf;
pub mod section;

pub use chart::render_price_chart;
pub use pdf::{render_pdf, RenderedDocument};
pub use section::{Align, Column, Section, Table};
