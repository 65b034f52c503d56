//! The editing pipeline built on the image operations.

pub mod background;
pub mod cache;
pub mod codec;
pub mod color;
pub mod config;
pub mod crop;
pub mod enhance;
pub mod filter;
pub mod frame;
pub mod pipeline;
pub mod remover;
