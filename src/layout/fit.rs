use crate::rect::Rect;
use crate::units::Pt;

/// Scale an image of intrinsic pixel size `width` × `height` to fit within
/// `bbox` without cropping or distortion.
///
/// The scale factor is `min(bbox_width / width, bbox_height / height)`, so
/// the placed image fills the box along at least one axis. The placement is
/// pinned to the box's left edge and centered vertically.
pub fn fit_within(width: u32, height: u32, bbox: Rect) -> Rect {
    let ratio = (bbox.width().0 / width as f32).min(bbox.height().0 / height as f32);
    let placed_width = Pt(width as f32 * ratio);
    let placed_height = Pt(height as f32 * ratio);

    let y1 = bbox.y1 + (bbox.height() - placed_height) / 2.0;

    Rect {
        x1: bbox.x1,
        y1,
        x2: bbox.x1 + placed_width,
        y2: y1 + placed_height,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn bbox(x1: f32, y1: f32, x2: f32, y2: f32) -> Rect {
        Rect {
            x1: Pt(x1),
            y1: Pt(y1),
            x2: Pt(x2),
            y2: Pt(y2),
        }
    }

    #[test]
    fn wide_image_fills_the_width_and_centers_vertically() {
        let placed = fit_within(800, 400, bbox(0.0, 0.0, 400.0, 300.0));
        assert_eq!(placed.width(), Pt(400.0));
        assert_eq!(placed.height(), Pt(200.0));
        assert_eq!(placed.y1, Pt(50.0));
        assert_eq!(placed.y2, Pt(250.0));
    }

    #[test]
    fn tall_image_fills_the_height() {
        let placed = fit_within(100, 300, bbox(10.0, 20.0, 410.0, 320.0));
        assert_eq!(placed.height(), Pt(300.0));
        assert_eq!(placed.width(), Pt(100.0));
        // pinned to the left edge of the box
        assert_eq!(placed.x1, Pt(10.0));
        // fills the full box height, so no vertical offset
        assert_eq!(placed.y1, Pt(20.0));
    }

    #[test]
    fn placement_respects_box_offset() {
        let placed = fit_within(800, 400, bbox(450.0, 50.0, 850.0, 350.0));
        assert_eq!(placed.x1, Pt(450.0));
        assert_eq!(placed.x2, Pt(850.0));
        assert_eq!(placed.y1, Pt(100.0));
    }
}
