pub mod alpha_composite;
pub mod clahe;
pub mod content_bounds;
pub mod convert_color;
pub mod filter3x3;
pub mod gaussian;
pub mod nlmeans;
pub mod padding;
pub mod summed_area_table;
