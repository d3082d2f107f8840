use serde::Serialize;

/// Axis-aligned bounding box for a detected face, in pixel coordinates of
/// the frame it was detected in. Valid only against that frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Raw detector score for this box.
    pub score: f32,
}

impl FaceBox {
    /// Clamp the box to `frame_w` x `frame_h`, returning `None` if nothing
    /// of it remains inside the frame.
    ///
    /// The detector can emit boxes that start at negative coordinates or
    /// run past the frame edge; cropping with those directly would read out
    /// of bounds.
    pub fn clamped(&self, frame_w: u32, frame_h: u32) -> Option<FaceBox> {
        let x0 = i64::from(self.x).clamp(0, i64::from(frame_w));
        let y0 = i64::from(self.y).clamp(0, i64::from(frame_h));
        let x1 = (i64::from(self.x) + i64::from(self.width)).clamp(0, i64::from(frame_w));
        let y1 = (i64::from(self.y) + i64::from(self.height)).clamp(0, i64::from(frame_h));

        let width = (x1 - x0) as u32;
        let height = (y1 - y0) as u32;
        if width == 0 || height == 0 {
            return None;
        }

        Some(FaceBox {
            x: x0 as i32,
            y: y0 as i32,
            width,
            height,
            score: self.score,
        })
    }
}

/// One annotated face from a processed frame: where it was, what the
/// classifier scored it, and the name that score mapped to (empty when the
/// score fell outside the label table).
#[derive(Debug, Clone, Serialize)]
pub struct FaceReport {
    pub bbox: FaceBox,
    pub score: f32,
    pub label: String,
}
