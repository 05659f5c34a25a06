//! Routing problem data and dimension validation.

use super::matrix::Matrix;
use crate::error::RoutingError;
use crate::formulation::FormulationKind;

/// Raw problem-size counts as delivered by a data loader.
///
/// Counts are signed so that a malformed input surfaces as
/// [`RoutingError::InvalidDimension`] instead of wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemSize {
    /// Number of candidate strings `S`.
    pub strings: i64,
    /// Number of ground arcs `G`.
    pub ground_arcs: i64,
    /// Number of flight legs `F`.
    pub flight_legs: i64,
    /// Number of maintenance locations `M`.
    pub maint_locations: i64,
    /// Fleet size cap.
    pub available_aircraft: i64,
}

/// Validated problem dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub strings: usize,
    pub ground_arcs: usize,
    pub flight_legs: usize,
    pub maint_locations: usize,
    pub available_aircraft: i64,
}

impl ProblemSize {
    /// Checks that no count is negative.
    pub fn validate(&self) -> Result<Dimensions, RoutingError> {
        Ok(Dimensions {
            strings: non_negative("strings", self.strings)?,
            ground_arcs: non_negative("ground_arcs", self.ground_arcs)?,
            flight_legs: non_negative("flight_legs", self.flight_legs)?,
            maint_locations: non_negative("maint_locations", self.maint_locations)?,
            available_aircraft: {
                non_negative("available_aircraft", self.available_aircraft)?;
                self.available_aircraft
            },
        })
    }
}

fn non_negative(name: &'static str, count: i64) -> Result<usize, RoutingError> {
    usize::try_from(count)
        .map_err(|_| RoutingError::dimension(name, format!("count must be non-negative, got {count}")))
}

/// Immutable routing problem instance.
///
/// Produced by an external loader and borrowed read-only while a model is
/// built. Which optional matrices must be present depends on the
/// formulation: the nominal model needs `prop_delay`, the robust model needs
/// `robust_cover`.
///
/// # Examples
///
/// ```
/// use u_aircraft_routing::data::{Matrix, ProblemData, ProblemSize};
/// use u_aircraft_routing::formulation::FormulationKind;
///
/// let size = ProblemSize { strings: 3, ground_arcs: 1, flight_legs: 2, maint_locations: 1, available_aircraft: 2 };
/// let data = ProblemData::new(size)
///     .with_cover(Matrix::from_rows(vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]]).unwrap())
///     .with_count(Matrix::row_vector(vec![1.0, 1.0, 1.0]), Matrix::row_vector(vec![1.0]))
///     .with_prop_delay(Matrix::row_vector(vec![4.0, 2.0, 7.0]));
///
/// let dims = data.validate(FormulationKind::Nominal).unwrap();
/// assert_eq!(dims.flight_legs, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemData {
    /// Problem-size counts.
    pub size: ProblemSize,
    /// F×S: does string `j` cover leg `i`.
    pub cover: Matrix,
    /// M×S: string contribution to inbound maintenance flow.
    pub maint_strings_in: Matrix,
    /// M×G: ground-arc contribution to inbound maintenance flow.
    pub maint_ground_in: Matrix,
    /// M×S: string contribution to outbound maintenance flow.
    pub maint_strings_out: Matrix,
    /// M×G: ground-arc contribution to outbound maintenance flow.
    pub maint_ground_out: Matrix,
    /// 1×S: aircraft count contribution of each string (row 0 is used).
    pub count_strings: Matrix,
    /// 1×G: aircraft count contribution of each ground arc (row 0 is used).
    pub count_ground: Matrix,
    /// 1×S propagation delay per string (nominal formulation).
    pub prop_delay: Option<Matrix>,
    /// F×S worst-case coverage coefficients (robust formulation).
    pub robust_cover: Option<Matrix>,
}

impl ProblemData {
    /// Creates data with all-zero matrices shaped after `size`.
    ///
    /// Negative counts are clamped to zero for the shapes; they are still
    /// reported by [`ProblemData::validate`].
    ///
    /// # Panics
    /// Panics if a matrix element count overflows `usize`. Loaders handling
    /// untrusted counts should build the struct directly and call
    /// [`ProblemData::validate`].
    pub fn new(size: ProblemSize) -> Self {
        let s = size.strings.max(0) as usize;
        let g = size.ground_arcs.max(0) as usize;
        let f = size.flight_legs.max(0) as usize;
        let m = size.maint_locations.max(0) as usize;
        Self {
            size,
            cover: Matrix::zeros(f, s),
            maint_strings_in: Matrix::zeros(m, s),
            maint_ground_in: Matrix::zeros(m, g),
            maint_strings_out: Matrix::zeros(m, s),
            maint_ground_out: Matrix::zeros(m, g),
            count_strings: Matrix::zeros(1, s),
            count_ground: Matrix::zeros(1, g),
            prop_delay: None,
            robust_cover: None,
        }
    }

    pub fn with_cover(mut self, cover: Matrix) -> Self {
        self.cover = cover;
        self
    }

    /// Replaces the inbound maintenance matrices (strings, ground).
    pub fn with_maint_in(mut self, strings: Matrix, ground: Matrix) -> Self {
        self.maint_strings_in = strings;
        self.maint_ground_in = ground;
        self
    }

    /// Replaces the outbound maintenance matrices (strings, ground).
    pub fn with_maint_out(mut self, strings: Matrix, ground: Matrix) -> Self {
        self.maint_strings_out = strings;
        self.maint_ground_out = ground;
        self
    }

    /// Replaces the aircraft count row vectors (strings, ground).
    pub fn with_count(mut self, strings: Matrix, ground: Matrix) -> Self {
        self.count_strings = strings;
        self.count_ground = ground;
        self
    }

    pub fn with_prop_delay(mut self, prop_delay: Matrix) -> Self {
        self.prop_delay = Some(prop_delay);
        self
    }

    pub fn with_robust_cover(mut self, robust_cover: Matrix) -> Self {
        self.robust_cover = Some(robust_cover);
        self
    }

    /// Validates counts and matrix shapes for the given formulation.
    ///
    /// Runs before any solver call so that a malformed instance never leaves
    /// a partially built model behind.
    pub fn validate(&self, kind: FormulationKind) -> Result<Dimensions, RoutingError> {
        let dims = self.size.validate()?;
        let (s, g, f, m) = (
            dims.strings,
            dims.ground_arcs,
            dims.flight_legs,
            dims.maint_locations,
        );

        expect_shape("cover", &self.cover, f, s)?;
        expect_shape("maint_strings_in", &self.maint_strings_in, m, s)?;
        expect_shape("maint_ground_in", &self.maint_ground_in, m, g)?;
        expect_shape("maint_strings_out", &self.maint_strings_out, m, s)?;
        expect_shape("maint_ground_out", &self.maint_ground_out, m, g)?;
        expect_row_vector("count_strings", &self.count_strings, s)?;
        expect_row_vector("count_ground", &self.count_ground, g)?;

        match kind {
            FormulationKind::Nominal => {
                let delay = self.prop_delay.as_ref().ok_or_else(|| {
                    RoutingError::dimension("prop_delay", "required by the nominal formulation")
                })?;
                expect_row_vector("prop_delay", delay, s)?;
            }
            FormulationKind::Robust => {
                let robust = self.robust_cover.as_ref().ok_or_else(|| {
                    RoutingError::dimension("robust_cover", "required by the robust formulation")
                })?;
                expect_shape("robust_cover", robust, f, s)?;
            }
        }

        Ok(dims)
    }
}

fn expect_shape(
    name: &'static str,
    matrix: &Matrix,
    rows: usize,
    cols: usize,
) -> Result<(), RoutingError> {
    if matrix.shape() == (rows, cols) || (matrix.is_empty() && (rows == 0 || cols == 0)) {
        return Ok(());
    }
    Err(RoutingError::dimension(
        name,
        format!(
            "expected {rows}x{cols}, got {}x{}",
            matrix.rows(),
            matrix.cols()
        ),
    ))
}

// Only row 0 is read, extra rows are tolerated.
fn expect_row_vector(name: &'static str, matrix: &Matrix, cols: usize) -> Result<(), RoutingError> {
    if cols == 0 && matrix.is_empty() {
        return Ok(());
    }
    if matrix.rows() == 0 || matrix.cols() != cols {
        return Err(RoutingError::dimension(
            name,
            format!(
                "expected at least 1x{cols}, got {}x{}",
                matrix.rows(),
                matrix.cols()
            ),
        ));
    }
    Ok(())
}
