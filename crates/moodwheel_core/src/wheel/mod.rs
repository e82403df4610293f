//! Emotion wheel geometry for the core and secondary pickers.
//!
//! # Responsibility
//! - Turn an ordered option list into SVG pie-wedge paths and label anchors.
//! - Keep all rendering math out of UI code.
//!
//! # Invariants
//! - Slices are equal-angle, clockwise from 12 o'clock, in option order.
//! - Geometry is expressed in a 200x200 view box centered at (100, 100).

pub mod wedge;
