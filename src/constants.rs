use crate::api::validation::NumericBounds;

/// Process-wide bounds for every stored counter and weight.
pub const NUMBER_BOUNDS: NumericBounds = NumericBounds {
    min: 1,
    max: 32000,
};

pub mod limits {

    pub const MAX_NAME_LENGTH: usize = 200;
}

pub mod weight {

    /// Unit suffix used in read representations, e.g. "150г".
    pub const UNIT_LABEL: &str = "г";

    /// An ingredient at or above this weight counts as "contained" for the
    /// recipes-without-product query.
    pub const EXCLUSION_THRESHOLD_GRAMS: i32 = 10;
}
