//! HTTP handlers for the properties domain

pub mod favorites;
pub mod groups;
pub mod properties;
pub mod tenant;
pub mod units;
