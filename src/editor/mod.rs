// Editor - Range selection, playback sampling and clip bookkeeping

pub mod clips;
pub mod range;
pub mod scrubber;
pub mod session;

pub use clips::ClipSet;
pub use range::{RangeModel, MIN_SEPARATION};
pub use scrubber::{DragTarget, Scrubber, DEFAULT_SAMPLE_PERIOD};
pub use session::EditorSession;
