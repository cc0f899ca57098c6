use derive_more::{Add, AddAssign, Deref, DerefMut, Display, From, Into, Sub, SubAssign, Sum};

/// A length in PDF points (1/72 of an inch). All page coordinates and
/// measurements in this crate are expressed in points.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Deref,
    DerefMut,
    Display,
    From,
    Into,
    Sum,
)]
pub struct Pt(pub f32);

/// A length in millimetres, convertible to [Pt]
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Display, From, Into)]
pub struct Mm(pub f32);

/// A length in inches, convertible to [Pt]
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Display, From, Into)]
pub struct In(pub f32);

impl From<Mm> for Pt {
    fn from(mm: Mm) -> Pt {
        Pt(mm.0 * 72.0 / 25.4)
    }
}

impl From<In> for Pt {
    fn from(inches: In) -> Pt {
        Pt(inches.0 * 72.0)
    }
}

impl From<Pt> for Mm {
    fn from(pt: Pt) -> Mm {
        Mm(pt.0 * 25.4 / 72.0)
    }
}

impl From<Pt> for In {
    fn from(pt: Pt) -> In {
        In(pt.0 / 72.0)
    }
}

impl std::ops::Mul<f32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl std::ops::Div<f32> for Pt {
    type Output = Pt;

    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

/// Dividing two lengths yields their dimensionless ratio
impl std::ops::Div<Pt> for Pt {
    type Output = f32;

    fn div(self, rhs: Pt) -> f32 {
        self.0 / rhs.0
    }
}
