//! AUSR: the leave-one-out quality score of a ranking.
//!
//! Each held-out bait contributes its recovered rank position if that
//! position falls inside the window, and nothing otherwise:
//!
//! AUSR = Σ{ p_i : p_i < W } / (W × n)
//!
//! The result lies in [0, 1). W is fixed per run (1000 by default) even
//! when fewer than W genes take part in a cluster.

/// AUSR of the recovered 0-indexed rank positions, or `None` when no bait
/// was held out.
pub fn compute_ausr(positions: &[usize], window: usize) -> Option<f64> {
    if positions.is_empty() || window == 0 {
        return None;
    }
    let inside: usize = positions.iter().filter(|&&p| p < window).sum();
    Some(inside as f64 / (window as f64 * positions.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula() {
        // (0 + 10 + 500) / (1000 * 3)
        let ausr = compute_ausr(&[0, 10, 500], 1000).unwrap();
        assert!((ausr - 510.0 / 3000.0).abs() < 1e-12);
    }

    #[test]
    fn test_positions_outside_window_contribute_nothing() {
        assert_eq!(compute_ausr(&[1000, 2500], 1000), Some(0.0));
        let ausr = compute_ausr(&[999, 1000], 1000).unwrap();
        assert!((ausr - 999.0 / 2000.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds() {
        for positions in [vec![0usize], vec![999, 999, 999], vec![3, 1200, 17, 0]] {
            let ausr = compute_ausr(&positions, 1000).unwrap();
            assert!((0.0..=1.0).contains(&ausr), "{positions:?} -> {ausr}");
        }
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(compute_ausr(&[], 1000), None);
    }
}
