//! Presentation state machines.
//!
//! These carry no rendering; a page drives them with events (load/error,
//! scroll/resize/frame, visibility, clicks) and reads back what to show.

pub mod count_up;
pub mod header;
pub mod image;
pub mod read_more;

pub use count_up::CountUp;
pub use header::{HeaderMode, ScrollHeader};
pub use image::{FallbackImage, ImageState};
pub use read_more::ReadMore;
