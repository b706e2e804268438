pub mod clock;
pub mod extractor;
pub mod test_utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use extractor::RequestContext;
