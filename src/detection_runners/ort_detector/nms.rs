pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    /// Boxes only suppress boxes of the same class.
    fn class_id(&self) -> usize;
}
