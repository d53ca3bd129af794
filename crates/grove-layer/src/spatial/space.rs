//! Coordinate spaces and z-values.
//!
//! A z-value packs an interleaving of the coordinates' fixed-point bits into
//! the high bits of a non-negative i64, most significant bit first, and the
//! number of interleaved bits into the low six bits:
//!
//! ```text
//!  63  62 ............................ 6  5 ...... 0
//! [ 0 ][ interleaved bits, left-aligned ][ bit count ]
//! ```

use grove_common::config::SpatialConfig;
use grove_common::constants::{DEFAULT_LATITUDE_BITS, DEFAULT_LONGITUDE_BITS, MAX_Z_BITS};
use grove_common::error::{GroveError, GroveResult};

/// A bounded N-dimensional space with a bit budget per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    lo: Vec<f64>,
    hi: Vec<f64>,
    bits: Vec<u32>,
    interleave: Vec<usize>,
}

impl Space {
    /// Creates a space.
    ///
    /// `interleave` lists the dimension that supplies each output bit, most
    /// significant first. Without one, dimensions take turns starting with
    /// the one with the most bits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for mismatched lengths, empty or inverted
    /// bounds, a zero bit budget, more than 57 bits in total, or an
    /// interleave that does not use each dimension exactly its bit count.
    pub fn new(lo: &[f64], hi: &[f64], bits: &[u32], interleave: Option<&[usize]>) -> GroveResult<Self> {
        let dims = bits.len();
        if dims == 0 || lo.len() != dims || hi.len() != dims {
            return Err(GroveError::invalid_argument(format!(
                "space needs matching bounds and bits, got {} lo, {} hi, {} bits",
                lo.len(),
                hi.len(),
                dims
            )));
        }
        for d in 0..dims {
            if !(lo[d].is_finite() && hi[d].is_finite() && lo[d] < hi[d]) {
                return Err(GroveError::invalid_argument(format!(
                    "dimension {} has bad bounds [{}, {}]",
                    d, lo[d], hi[d]
                )));
            }
            if bits[d] == 0 {
                return Err(GroveError::invalid_argument(format!("dimension {} has no bits", d)));
            }
        }
        let total: u32 = bits.iter().sum();
        if total > MAX_Z_BITS {
            return Err(GroveError::invalid_argument(format!(
                "space uses {} bits, at most {} fit a z-value",
                total, MAX_Z_BITS
            )));
        }

        let interleave = match interleave {
            Some(pattern) => {
                let mut used = vec![0u32; dims];
                for &d in pattern {
                    let slot = used.get_mut(d).ok_or_else(|| {
                        GroveError::invalid_argument(format!("interleave names dimension {}", d))
                    })?;
                    *slot += 1;
                }
                if used != bits {
                    return Err(GroveError::invalid_argument(
                        "interleave must use each dimension once per bit",
                    ));
                }
                pattern.to_vec()
            }
            None => default_interleave(bits),
        };

        Ok(Self {
            lo: lo.to_vec(),
            hi: hi.to_vec(),
            bits: bits.to_vec(),
            interleave,
        })
    }

    /// Latitude [-90, 90] and longitude [-180, 180] with the default bit
    /// budgets. Dimension 0 is latitude.
    pub fn lat_lon() -> Self {
        Self {
            lo: vec![-90.0, -180.0],
            hi: vec![90.0, 180.0],
            bits: vec![DEFAULT_LATITUDE_BITS, DEFAULT_LONGITUDE_BITS],
            interleave: default_interleave(&[DEFAULT_LATITUDE_BITS, DEFAULT_LONGITUDE_BITS]),
        }
    }

    /// Latitude/longitude space with custom bit budgets.
    pub fn lat_lon_with_bits(latitude_bits: u32, longitude_bits: u32) -> GroveResult<Self> {
        Self::new(
            &[-90.0, -180.0],
            &[90.0, 180.0],
            &[latitude_bits, longitude_bits],
            None,
        )
    }

    /// Latitude/longitude space from configuration.
    pub fn from_config(config: &SpatialConfig) -> GroveResult<Self> {
        Self::lat_lon_with_bits(config.latitude_bits, config.longitude_bits)
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.bits.len()
    }

    /// Total interleaved bits.
    pub fn total_bits(&self) -> u32 {
        self.bits.iter().sum()
    }

    /// Returns the interleave pattern.
    pub fn interleave(&self) -> &[usize] {
        &self.interleave
    }

    /// Maps a coordinate onto `[0, 2^bits - 1]` of dimension `dim`.
    ///
    /// Out-of-range coordinates are clamped; NaN is rejected.
    pub fn fixed_point(&self, dim: usize, coord: f64) -> GroveResult<u64> {
        let bits = *self
            .bits
            .get(dim)
            .ok_or_else(|| GroveError::invalid_argument(format!("no dimension {}", dim)))?;
        if coord.is_nan() {
            return Err(GroveError::invalid_argument(format!(
                "coordinate of dimension {} is NaN",
                dim
            )));
        }
        let cells = (1u64 << bits) as f64;
        let max = (1u64 << bits) - 1;
        let scaled = ((coord - self.lo[dim]) / (self.hi[dim] - self.lo[dim]) * cells).floor();
        Ok(if scaled <= 0.0 {
            0
        } else if scaled >= max as f64 {
            max
        } else {
            scaled as u64
        })
    }

    /// Computes the z-value of a point.
    pub fn shuffle(&self, coords: &[f64]) -> GroveResult<i64> {
        if coords.len() != self.dimensions() {
            return Err(GroveError::invalid_argument(format!(
                "point has {} coordinates, space has {} dimensions",
                coords.len(),
                self.dimensions()
            )));
        }
        let fixed = coords
            .iter()
            .enumerate()
            .map(|(d, &c)| self.fixed_point(d, c))
            .collect::<GroveResult<Vec<_>>>()?;
        self.shuffle_fixed(&fixed)
    }

    /// Computes the z-value of a point already in fixed point.
    pub fn shuffle_fixed(&self, fixed: &[u64]) -> GroveResult<i64> {
        if fixed.len() != self.dimensions() {
            return Err(GroveError::invalid_argument(format!(
                "point has {} coordinates, space has {} dimensions",
                fixed.len(),
                self.dimensions()
            )));
        }
        let mut remaining = self.bits.clone();
        let mut z: u64 = 0;
        for &d in &self.interleave {
            remaining[d] -= 1;
            z = (z << 1) | ((fixed[d] >> remaining[d]) & 1);
        }
        let n = self.total_bits();
        let packed = (z << (63 - n)) | u64::from(n);
        // total_bits <= 57 keeps bit 63 clear
        i64::try_from(packed).map_err(|_| GroveError::internal("z-value overflowed i64"))
    }
}

fn default_interleave(bits: &[u32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..bits.len()).collect();
    order.sort_by(|&a, &b| bits[b].cmp(&bits[a]));
    let mut remaining = bits.to_vec();
    let total: u32 = bits.iter().sum();
    let mut pattern = Vec::with_capacity(total as usize);
    while pattern.len() < total as usize {
        for &d in &order {
            if remaining[d] > 0 {
                remaining[d] -= 1;
                pattern.push(d);
            }
        }
    }
    pattern
}
