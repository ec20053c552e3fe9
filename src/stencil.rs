//! Five-point Jacobi update of one stripe.

use crate::error::{SolverError, SolverResult};
use crate::halo::Halo;
use crate::types::Stripe;

/// Jacobi update for `Δu = θ` on an `n × n` grid with zero Dirichlet boundary.
#[derive(Debug, Clone, Copy)]
pub struct Stencil {
    n: usize,
    /// `delta² · theta`, subtracted from the neighbour sum of every interior cell.
    forcing: f64,
}

impl Stencil {
    pub fn new(n: usize, delta: f64, theta: f64) -> Self {
        Self {
            n,
            forcing: delta * delta * theta,
        }
    }

    /// Value of an interior cell from its four neighbours of the previous iteration.
    #[inline]
    pub fn cell(&self, up: f64, down: f64, left: f64, right: f64) -> f64 {
        (up + down + left + right - self.forcing) / 4.0
    }

    /// Compute the next iterate of `old` into `new`, overwriting every value of `new`.
    ///
    /// Rows on the stripe's edges read their outer neighbour from `halo`. Global rows
    /// `0` and `n - 1` and columns `0` and `n - 1` are written as zero.
    pub fn apply(&self, old: &Stripe, halo: &Halo, rank: usize, new: &mut Stripe) -> SolverResult<()> {
        let n = self.n;
        let rows = old.rows();

        for local in 0..rows {
            let global = old.first_row() + local;
            let out = new.row_mut(local);

            if global == 0 || global + 1 == n {
                out.fill(0.0);
                continue;
            }

            let up = if local == 0 {
                halo.upper.as_deref().ok_or(SolverError::MissingHalo {
                    rank,
                    side: "upper",
                    row: global,
                })?
            } else {
                old.row(local - 1)
            };
            let down = if local + 1 == rows {
                halo.lower.as_deref().ok_or(SolverError::MissingHalo {
                    rank,
                    side: "lower",
                    row: global,
                })?
            } else {
                old.row(local + 1)
            };
            let current = old.row(local);

            out[0] = 0.0;
            for col in 1..n - 1 {
                out[col] = self.cell(up[col], down[col], current[col - 1], current[col + 1]);
            }
            out[n - 1] = 0.0;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn no_halo() -> Halo {
        Halo { upper: None, lower: None }
    }

    #[test]
    fn test_single_interior_cell() {
        let stencil = Stencil::new(5, 0.25, 1.0);
        let old = Stripe::zeros(0, 5, 5);
        let mut new = Stripe::zeros(0, 5, 5);

        stencil.apply(&old, &no_halo(), 0, &mut new).unwrap();

        let expected = (0.0 - 0.25f64 * 0.25) / 4.0;
        assert_eq!(new.row(2)[2], expected);
        assert_relative_eq!(new.row(2)[2], -1.0 / 64.0);
        assert_eq!(new.row(1)[1], expected);
        assert_eq!(new.row(0), &[0.0; 5]);
        assert_eq!(new.row(4), &[0.0; 5]);
        assert_eq!(new.row(3)[0], 0.0);
        assert_eq!(new.row(3)[4], 0.0);
    }

    #[test]
    fn test_halo_rows_feed_stripe_edges() {
        // Rows 1..=2 of a 4 × 4 grid; both physical edges belong to other ranks.
        let stencil = Stencil::new(4, 1.0, 0.0);
        let old = Stripe::zeros(1, 2, 4);
        let halo = Halo {
            upper: Some(vec![0.0, 4.0, 8.0, 0.0]),
            lower: Some(vec![0.0, 12.0, 16.0, 0.0]),
        };
        let mut new = Stripe::zeros(1, 2, 4);

        stencil.apply(&old, &halo, 1, &mut new).unwrap();

        assert_eq!(new.row(0), &[0.0, 1.0, 2.0, 0.0]);
        assert_eq!(new.row(1), &[0.0, 3.0, 4.0, 0.0]);
    }

    #[test]
    fn test_previous_buffer_is_read_only_source() {
        let stencil = Stencil::new(4, 1.0, 0.0);
        let mut old = Stripe::zeros(0, 4, 4);
        old.row_mut(1).copy_from_slice(&[0.0, 8.0, 0.0, 0.0]);
        let mut new = Stripe::zeros(0, 4, 4);
        new.row_mut(1).fill(123.0);

        stencil.apply(&old, &no_halo(), 0, &mut new).unwrap();

        // (1,2) sees its left neighbour's old value, not anything written this pass.
        assert_eq!(new.row(1), &[0.0, 0.0, 2.0, 0.0]);
        assert_eq!(new.row(2), &[0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_halo_is_an_error() {
        let stencil = Stencil::new(4, 1.0, 1.0);
        let old = Stripe::zeros(2, 1, 4);
        let mut new = Stripe::zeros(2, 1, 4);
        let err = stencil.apply(&old, &no_halo(), 2, &mut new).unwrap_err();
        assert!(matches!(err, SolverError::MissingHalo { side: "upper", row: 2, .. }));
    }
}
