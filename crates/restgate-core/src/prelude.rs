pub use restgate_types::error::{Error, RgResult};
pub use restgate_types::types::{Record, Subject};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
