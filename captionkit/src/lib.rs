//! Captionkit
//!
//! Word-synchronized caption generation for short-form vertical video.

pub mod core;
