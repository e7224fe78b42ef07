//! Sprint Report URL Codec
//!
//! Reversible encoding of the dashboard selection into a URL fragment.
//!
//! # Format
//!
//! ```text
//! #project_<p1>&<p2>|feature_team~<f1>&<f2>|count_<first>&<current>&<last>|...
//! ```
//!
//! - The project segment is always first and always present
//! - Other segments are emitted only when they differ from their default
//!   or are forced by a [`SelectionPatch`]
//! - Decoding accepts the legacy `!` and `,` separators and ignores unknown
//!   keys
//!
//! # Example
//!
//! ```rust,ignore
//! use sprint_url::{decode, encode, SelectionPatch};
//!
//! let report = decode(&mut state, "#project_~recent|format_line");
//! let link = encode(&state, &SelectionPatch::new().with_closed(true));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod decode;
pub mod encode;
pub mod error;
pub mod fragment;
pub mod key;
pub mod patch;

// Re-exports for convenience
pub use decode::{decode, feature_selection, navigate, parse_window, NavigationReport};
pub use encode::{encode, feature_tokens};
pub use error::DecodeError;
pub use fragment::{Fragment, Segment};
pub use key::{
    split_values, UrlKey, KEY_SEPARATOR, LEGACY_SEGMENT_SEPARATOR, LEGACY_VALUE_SEPARATOR,
    PROJECT_PREFIX, SEGMENT_SEPARATOR, TEAM_PREFIX, VALUE_SEPARATOR,
};
pub use patch::SelectionPatch;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
