/// User interface components
///
/// - Annotation canvas with the image and polygon overlay (canvas.rs)
/// - Control bar with actions and ROI selector (controls.rs)
/// - Image list panel (file_list.rs)

pub mod canvas;
pub mod controls;
pub mod file_list;
