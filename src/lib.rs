//! Pixelpad core: a bitmap paint engine built around a committed base
//! raster plus a transient preview overlay, snapshot undo/redo, a zoom/pan
//! viewport, and a family of gesture-driven tools. The egui shell in
//! `app.rs` is a thin host; everything here is UI-framework free and
//! drives the same semantics from tests.

pub mod app;
pub mod canvas;
pub mod clipboard;
pub mod draw;
pub mod fill;
pub mod history;
pub mod io;
pub mod logger;
pub mod raster;
pub mod text;
pub mod tools;
pub mod viewport;

pub use canvas::{Canvas, Connectivity, FontSpec, Selection, ToolSettings};
pub use fill::{flood_fill, FillOutcome};
pub use history::History;
pub use raster::PixelBuffer;
pub use viewport::Viewport;
