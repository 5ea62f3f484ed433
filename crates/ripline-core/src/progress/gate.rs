//! The progress capability handed to transforms and rip sources.

/// Accepts integer percentages in `0..=100`.
///
/// Anything that persists or displays progress implements this. Producers
/// should report through a [`ProgressGate`] so the sink only ever sees
/// strictly increasing values.
pub trait ProgressSink: Send {
    fn report(&mut self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: FnMut(u8) + Send,
{
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Forwards a percentage to the wrapped sink only when it is strictly greater
/// than the last forwarded one. One gate per run; never shared.
pub struct ProgressGate<S> {
    sink: S,
    last: Option<u8>,
}

impl<S: ProgressSink> ProgressGate<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, last: None }
    }

    /// Offers a percentage (clamped to 100). Returns true if it was forwarded.
    pub fn offer(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return false;
        }
        self.last = Some(percent);
        self.sink.report(percent);
        true
    }

    /// Last forwarded value, if any.
    pub fn last(&self) -> Option<u8> {
        self.last
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S: ProgressSink> ProgressSink for ProgressGate<S> {
    fn report(&mut self, percent: u8) {
        self.offer(percent);
    }
}
