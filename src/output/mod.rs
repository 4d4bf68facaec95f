//! Report renderers and persistence.
//!
//! Markdown and PDF are always written; CSV is optional. All three share the
//! column order of [`Report::header`](crate::report::Report::header).

mod csv_export;
mod markdown;
mod pdf;

pub use csv_export::write_csv;
pub use markdown::{render_markdown, write_markdown};
pub use pdf::{render_pdf, write_pdf};
