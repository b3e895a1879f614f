//! Discrete observation and action spaces
//!
//! Environments describe the shape of what they emit and accept through
//! these spaces. Only finite discrete spaces are supported.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A finite discrete space `{0, 1, ..., n - 1}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Discrete {
    /// Number of elements in the space
    pub n: usize,
}

impl Discrete {
    /// Create a discrete space with `n` elements
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Whether `value` lies in the space
    pub fn contains(&self, value: usize) -> bool {
        value < self.n
    }

    /// Draw a uniformly random element
    ///
    /// The space must be non-empty.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        rng.random_range(0..self.n)
    }
}

/// Cartesian product of discrete spaces
///
/// Grid environments expose a tuple whose first two members are the x and y
/// coordinates; further members are carried but ignored by the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleSpace {
    pub spaces: Vec<Discrete>,
}

impl TupleSpace {
    pub fn new(spaces: Vec<Discrete>) -> Self {
        Self { spaces }
    }

    /// Two-dimensional grid space of `x_dims` by `y_dims`
    pub fn grid(x_dims: usize, y_dims: usize) -> Self {
        Self::new(vec![Discrete::new(x_dims), Discrete::new(y_dims)])
    }

    /// Sizes of the first two dimensions
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than two dimensions or either of
    /// the first two is empty.
    pub fn grid_dims(&self) -> Result<(usize, usize)> {
        let [x, y, ..] = self.spaces.as_slice() else {
            return Err(Error::MissingDimensions {
                got: self.spaces.len(),
            });
        };
        if x.n == 0 {
            return Err(Error::EmptySpace {
                space: "observation x".to_string(),
            });
        }
        if y.n == 0 {
            return Err(Error::EmptySpace {
                space: "observation y".to_string(),
            });
        }
        Ok((x.n, y.n))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn sample_stays_in_range() {
        let space = Discrete::new(3);
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let value = space.sample(&mut rng);
            assert!(space.contains(value));
            seen[value] = true;
        }
        assert!(seen.iter().all(|&s| s), "every action should be sampled");
    }

    #[test]
    fn grid_dims_requires_two_dimensions() {
        let space = TupleSpace::new(vec![Discrete::new(4)]);
        assert!(matches!(
            space.grid_dims(),
            Err(Error::MissingDimensions { got: 1 })
        ));
    }

    #[test]
    fn grid_dims_rejects_empty_dimension() {
        let space = TupleSpace::grid(3, 0);
        assert!(matches!(space.grid_dims(), Err(Error::EmptySpace { .. })));
    }

    #[test]
    fn grid_dims_ignores_extra_dimensions() {
        let space = TupleSpace::new(vec![Discrete::new(5), Discrete::new(2), Discrete::new(9)]);
        assert_eq!(space.grid_dims().unwrap(), (5, 2));
    }
}
