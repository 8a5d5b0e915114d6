use crate::detection::frame::RawFrame;
use crate::detection::geometry::CaptureRegion;
use crate::error::Result;

/// Provider of raw pixel buffers for a logical screen region.
///
/// The returned buffer may be larger than the region on high-density
/// displays; callers account for that through the measured scale.
pub trait FrameSource {
    fn capture(&mut self, region: &CaptureRegion) -> Result<RawFrame>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn capture(&mut self, region: &CaptureRegion) -> Result<RawFrame> {
        (**self).capture(region)
    }
}

/// Factory function to create an appropriate frame source based on the dry_run flag.
///
/// Must be called on the thread that will use the source: platform capture
/// handles are not guaranteed to be `Send`.
pub fn create_frame_source(dry_run: bool) -> Box<dyn FrameSource> {
    if dry_run {
        Box::new(super::synthetic::SyntheticFrameSource::new())
    } else {
        Box::new(super::xcap_source::XcapFrameSource::new())
    }
}
