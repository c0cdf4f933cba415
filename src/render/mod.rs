//! Markdown-to-PDF rendering.
//!
//! Layout is pure: [`rich`] (token tree) and [`plain`] (line by line) both
//! produce [`layout::LaidOutPage`]s of draw operations. [`paint`] replays
//! them onto a pdfium document. [`assets`] loads images referenced from
//! Markdown.

pub mod assets;
pub mod layout;
pub mod paint;
pub mod plain;
pub mod rich;
pub mod tokens;
