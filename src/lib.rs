//! # Responsive Images
//!
//! Batch generator for responsive image derivatives. A task file declares a
//! list of target sizes and the source images to derive them from; a run
//! produces one output file per (source, size) pair, skips work that is
//! already done, and bounds how many transforms run at once.
//!
//! # Architecture
//!
//! ```text
//! task file ─→ config ─→ spec (+ validate, naming) ─┐
//!                    └─→ scan ──────────────────────┤
//!                                                   ▼
//!                       process: per spec, per source (rayon pool)
//!                         destination → skip → imaging::plan → engine
//!                                                   │
//!                                            tally → output
//! ```
//!
//! Specs are fully resolved before any image is touched: defaults are
//! merged, values validated, names derived. Everything downstream works on
//! the typed [`spec::SizeSpec`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Task file loading, defaults, validation, stock `gen-config` output |
//! | [`spec`] | Typed size spec, built from run options plus one size entry |
//! | [`validate`] | Width/height syntax, quality range, custom argument checks |
//! | [`naming`] | Display names from sizes and unit labels; output name suffixes |
//! | [`destination`] | Output paths, plain or `{%= field %}` templated |
//! | [`skip`] | Newer-only policy |
//! | [`scan`] | Source discovery with glob patterns |
//! | [`imaging`] | Transform planning and the image engines (built-in, gm, im) |
//! | [`process`] | Run coordination, concurrency bound, per-spec tally |
//! | [`output`] | CLI output formatting for progress, summary and check |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Built-In Engine By Default
//!
//! The default engine decodes, resizes and encodes with the `image` crate,
//! so a run needs no system packages. GraphicsMagick and ImageMagick remain
//! available for their extra formats and for raw `custom_in`/`custom_out`
//! arguments, which only a command line engine can honour.
//!
//! ## One Pool, Specs In Order
//!
//! A run builds one rayon pool with `concurrency` threads and feeds it one
//! spec at a time. A spec's tally is read only after all of its units have
//! finished, and at most `concurrency` transforms are ever in flight.

pub mod config;
pub mod destination;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod skip;
pub mod spec;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
