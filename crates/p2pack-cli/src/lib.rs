//! Command-line front ends for p2pack
//!
//! Binaries:
//! - `feature-builder` - Write an Eclipse feature.xml descriptor
//! - `site-builder` - Build a zipped p2 update site

pub mod feature;
pub mod logging;
pub mod site;
