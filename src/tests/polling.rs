use glam::DVec3;

use crate::Conic;

pub(super) const CONIC_POLL_POINTS: usize = 256;

/// Positions over one period for elliptic conics, or over `span` seconds
/// centered on the reference time for hyperbolic ones.
pub(super) fn poll_conic(conic: &Conic, span: f64) -> Vec<DVec3> {
    let start = conic.reference_time();
    let (from, length) = match conic.period() {
        Some(period) => (start, period),
        None => (start - 0.5 * span, span),
    };

    (0..CONIC_POLL_POINTS)
        .map(|i| {
            let time = from + length * i as f64 / CONIC_POLL_POINTS as f64;
            conic.position_at_time(time)
        })
        .collect()
}
