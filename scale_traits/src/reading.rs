/// One weight measurement reported by the instrument.
///
/// - `weight`: magnitude in kilograms
/// - `stable`: true once the instrument reports the load has settled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub weight: f64,
    pub stable: bool,
}

impl Reading {
    #[inline]
    pub const fn new(weight: f64, stable: bool) -> Self {
        Self { weight, stable }
    }

    #[inline]
    pub const fn stable(weight: f64) -> Self {
        Self::new(weight, true)
    }

    #[inline]
    pub const fn unstable(weight: f64) -> Self {
        Self::new(weight, false)
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.stable { "stable" } else { "unstable" };
        write!(f, "{:.3} kg ({state})", self.weight)
    }
}
