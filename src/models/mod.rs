pub mod activity;
pub mod circle;
pub mod common;
pub mod content;
pub mod feed;
pub mod profile;
