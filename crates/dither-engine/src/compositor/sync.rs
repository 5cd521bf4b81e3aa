use crate::coords::{PixelExtent, ViewportMetrics};

/// Tracks viewport/DPR changes between frames and applies them before the next one.
///
/// Only the most recent observation is kept. A failed apply leaves it pending so the
/// following frame retries; an observation equal to what is already applied cancels
/// anything pending.
#[derive(Debug, Default, Clone)]
pub struct ResolutionSync {
    pending: Option<ViewportMetrics>,
    applied: Option<ViewportMetrics>,
}

impl ResolutionSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, metrics: ViewportMetrics) {
        self.pending = (self.applied != Some(metrics)).then_some(metrics);
    }

    #[inline]
    pub fn pending(&self) -> Option<ViewportMetrics> {
        self.pending
    }

    #[inline]
    pub fn applied(&self) -> Option<ViewportMetrics> {
        self.applied
    }

    /// True once something has been applied and nothing newer is waiting.
    #[inline]
    pub fn is_converged(&self) -> bool {
        self.pending.is_none() && self.applied.is_some()
    }

    /// Applies the pending change through `apply`.
    ///
    /// Returns the extent that was applied, or `Ok(None)` when nothing was pending.
    pub fn converge<E>(
        &mut self,
        apply: impl FnOnce(ViewportMetrics) -> Result<(), E>,
    ) -> Result<Option<PixelExtent>, E> {
        let Some(metrics) = self.pending else {
            return Ok(None);
        };
        apply(metrics)?;
        self.pending = None;
        self.applied = Some(metrics);
        Ok(Some(metrics.pixel_extent()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;

    fn metrics(w: f64, h: f64, dpr: f64) -> ViewportMetrics {
        ViewportMetrics::new(Viewport::new(w, h), dpr)
    }

    /// Stand-in buffer: records every extent it was resized to.
    #[derive(Default)]
    struct FakeBuffer {
        extent: Option<PixelExtent>,
        resizes: usize,
    }

    impl FakeBuffer {
        fn apply(&mut self, m: ViewportMetrics) -> Result<(), ()> {
            self.extent = Some(m.pixel_extent());
            self.resizes += 1;
            Ok(())
        }
    }

    #[test]
    fn initial_mount_is_pending_until_converged() {
        let mut sync = ResolutionSync::new();
        assert!(!sync.is_converged());
        sync.observe(metrics(800.0, 600.0, 2.0));

        let mut buf = FakeBuffer::default();
        let applied = sync.converge(|m| buf.apply(m)).unwrap();
        assert_eq!(applied, Some(PixelExtent::new(1600, 1200)));
        assert_eq!(buf.extent, Some(PixelExtent::new(1600, 1200)));
        assert!(sync.is_converged());
    }

    #[test]
    fn only_latest_change_between_frames_is_applied() {
        let mut sync = ResolutionSync::new();
        let mut buf = FakeBuffer::default();

        sync.observe(metrics(800.0, 600.0, 1.0));
        sync.observe(metrics(1024.0, 768.0, 1.0));
        sync.observe(metrics(1024.0, 768.0, 1.5));
        sync.converge(|m| buf.apply(m)).unwrap();

        assert_eq!(buf.resizes, 1);
        assert_eq!(buf.extent, Some(PixelExtent::new(1536, 1152)));
    }

    #[test]
    fn extent_tracks_last_applied_pair() {
        let mut sync = ResolutionSync::new();
        let mut buf = FakeBuffer::default();
        let sequence = [
            (800.0, 600.0, 1.0),
            (333.3, 100.7, 1.25),
            (0.0, 480.0, 2.0),
            (1920.0, 1080.0, 0.75),
        ];

        for (w, h, dpr) in sequence {
            sync.observe(metrics(w, h, dpr));
            sync.converge(|m| buf.apply(m)).unwrap();
            let expected = PixelExtent::new((w * dpr).floor() as u32, (h * dpr).floor() as u32);
            assert_eq!(buf.extent, Some(expected));
        }
        assert_eq!(buf.extent, Some(PixelExtent::new(1440, 810)));
    }

    #[test]
    fn failed_apply_stays_pending_and_retries() {
        let mut sync = ResolutionSync::new();
        sync.observe(metrics(100.0, 100.0, 1.0));

        let failed: Result<_, &str> = sync.converge(|_| Err("out of memory"));
        assert_eq!(failed, Err("out of memory"));
        assert_eq!(sync.pending(), Some(metrics(100.0, 100.0, 1.0)));
        assert!(sync.applied().is_none());

        let mut buf = FakeBuffer::default();
        sync.converge(|m| buf.apply(m)).unwrap();
        assert_eq!(buf.extent, Some(PixelExtent::new(100, 100)));
        assert!(sync.is_converged());
    }

    #[test]
    fn unchanged_metrics_do_not_reallocate() {
        let mut sync = ResolutionSync::new();
        let mut buf = FakeBuffer::default();
        sync.observe(metrics(640.0, 480.0, 1.0));
        sync.converge(|m| buf.apply(m)).unwrap();

        sync.observe(metrics(640.0, 480.0, 1.0));
        assert_eq!(sync.converge(|m| buf.apply(m)).unwrap(), None);

        // Resize and back before a frame runs: nothing left to do.
        sync.observe(metrics(700.0, 480.0, 1.0));
        sync.observe(metrics(640.0, 480.0, 1.0));
        assert_eq!(sync.converge(|m| buf.apply(m)).unwrap(), None);
        assert_eq!(buf.resizes, 1);
    }
}
