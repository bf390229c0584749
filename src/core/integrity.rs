use crate::{core::record::NormalizedPriceRecord, prelude::*};

/// Check that the window consists of properly normalized records.
///
/// A failure means the normalization cache went out of sync with its input.
pub fn verify(window: &[NormalizedPriceRecord]) -> Result {
    for record in window {
        ensure!(
            record.display_price.0.is_finite(),
            "`{}` has a non-finite display price",
            record.time_start,
        );
        ensure!(
            record.start.timestamp_millis() == record.timestamp,
            "`{}` has a stale timestamp",
            record.time_start,
        );
    }
    for (lhs, rhs) in window.iter().zip(window.iter().skip(1)) {
        ensure!(
            lhs.timestamp < rhs.timestamp,
            "`{}` does not precede `{}`",
            lhs.time_start,
            rhs.time_start,
        );
    }
    Ok(())
}
