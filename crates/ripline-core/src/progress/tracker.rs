//! Overall percentage across a multi-title rip.

/// `current / max` as a rounded integer percentage, clamped to `0..=100`.
/// A zero `max` yields 0.
pub fn percent_of(current: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    let pct = (current as f64 / max as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Combines the "saving title i of N" counter with per-title `PRGV` records.
///
/// makemkvcon restarts `PRGV` at zero for every title; without the counter the
/// raw value would go backwards between titles.
#[derive(Debug, Default, Clone)]
pub struct ProgressTracker {
    title: Option<(u32, u32)>,
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the 1-based title currently being saved out of `total`.
    pub fn set_title(&mut self, index: u32, total: u32) {
        if total > 0 && index >= 1 && index <= total {
            self.title = Some((index, total));
        }
    }

    /// Feeds one `PRGV` record. Returns the overall percentage when it advanced.
    pub fn observe(&mut self, current: u32, max: u32) -> Option<u8> {
        if max == 0 {
            return None;
        }
        let fraction = (current as f64 / max as f64).clamp(0.0, 1.0);
        let overall = match self.title {
            Some((index, total)) => ((index - 1) as f64 + fraction) / total as f64,
            None => fraction,
        };
        let pct = (overall * 100.0).round().clamp(0.0, 100.0) as u8;
        if self.last.is_some_and(|last| pct <= last) {
            return None;
        }
        self.last = Some(pct);
        Some(pct)
    }

    /// Highest overall percentage seen so far.
    pub fn percent(&self) -> u8 {
        self.last.unwrap_or(0)
    }
}
