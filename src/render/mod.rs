//! Map rendering.
//!
//! Split in two: `markers` turns aggregated state into renderable values
//! (marker list, legend segments, summary metrics) and is pure; `html`
//! assembles those values into the final Leaflet page.

pub mod html;
pub mod markers;
