/// Vertical letterbox padding.
pub mod vertical3x4;
