/// State management module
///
/// This module handles all application state, including:
/// - ROI types, points and polygons (roi.rs)
/// - Per-image records and statistics (data.rs)
/// - The annotation session and its state machine (session.rs)

pub mod data;
pub mod roi;
pub mod session;
