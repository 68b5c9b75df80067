#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core B-axis constant-surface-speed rewriting (I/O-agnostic where possible).
//!
//! A ball-end mill cuts with a smaller effective diameter the closer the
//! contact point gets to the tool tip. When a 5-axis program tilts the B axis,
//! the cutting speed changes with it. This crate rewrites EIA/ISO programs so
//! an `S` word follows each B change and the surface speed stays put.
//!
//! ## Architecture
//!
//! - **Parsing**: M03/M05, B and S tokens from one line (`parser` module)
//! - **Speed model**: theta -> rpm with rounding, clamping and a deadband (`rpm_model`)
//! - **Injection**: the one-line-delayed state machine (`injector`)
//! - **Encoding**: UTF-8 / Shift_JIS detection and newline handling (`encoding`)
//! - **Streaming**: file in, file + JSON report out (`transducer`, `report`)
//!
//! Output lines are the input's raw bytes; only inserted `S` lines are new.

pub mod config;
pub mod conversions;
pub mod encoding;
pub mod error;
pub mod injector;
pub mod parser;
pub mod report;
pub mod rpm_model;
pub mod transducer;
pub mod util;

pub use config::{BcssConfig, RpmMode};
pub use error::{BcssError, Result};
pub use injector::{Injector, Insertion};
pub use parser::{ParsedLine, parse_line};
pub use report::{Report, Stats};
pub use rpm_model::{RpmDecision, RpmModel};
pub use transducer::{OutputPaths, Transducer, process_file, process_file_with, transform_bytes};
