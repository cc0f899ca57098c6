use crate::units::Pt;

/// Margins are used when laying out objects on a page. There is no control
/// preventing objects on pages to overflow the margins—the margins are there
/// as guidelines for layout functions. Additionally, the margins are applied
/// to [`Page`](crate::Page)s to determine the `ContentBox` attribute of each page in the
/// generated PDF
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    /// Create margins by specifying individual components in a clockwise fashion
    /// starting at the top (in the same order as CSS margins)
    pub fn trbl(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Margins {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create margins where all values are equal
    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create margins by specifying different values for vertical (top and bottom)
    /// and horizontal (left and right) margins
    pub fn symmetric<V: Into<Pt>, H: Into<Pt>>(vertical: V, horizontal: H) -> Margins {
        let vertical: Pt = vertical.into();
        let horizontal: Pt = horizontal.into();
        Margins {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}
