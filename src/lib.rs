//! softfilter runs software pixel filters over raw framebuffers.
//!
//! Every filter implements the same contract: it advertises the color formats it accepts and
//! produces, is activated once with the negotiated formats and a requested thread count, reports
//! how many threads it actually grants, and turns each frame into work packets that a host runs.
//!
//! # Lifecycle
//!
//! 1. **Negotiate**: [`SoftFilter::input_formats`] / [`SoftFilter::output_formats`] against the
//!    host's [`FormatMask`].
//! 2. **Create**: [`SoftFilter::create`] returns a [`FilterInstance`]; dropping it destroys it.
//! 3. **Size**: [`FilterInstance::output_size`] before allocating the destination buffer.
//! 4. **Dispatch**: [`FilterInstance::build_packets`] per frame; run each [`WorkPacket`].
//!
//! [`FilterRunner`] performs all four steps for a host and runs packets on a `rayon` pool when a
//! filter grants more than one thread.
//!
//! # Built-in filters
//!
//! - [`Vertical3x4`]: letterbox padding that grows the frame to the height of a 16:9 frame of the
//!   same width. Single threaded.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// The filter contract and registry.
pub mod filter;
/// Built-in filter implementations.
pub mod filters;
/// Host-side driving helpers.
pub mod host;

pub use crate::filter::contract::{
    CreateParams, FilterDescriptor, FilterInstance, SOFTFILTER_API_VERSION, SoftFilter,
};
pub use crate::filter::packet::{FrameIo, Packets, WorkFn, WorkPacket, WorkUnit, WorkerSlot};
pub use crate::filter::registry::FilterKind;
pub use crate::filters::vertical3x4::{
    Vertical3x4, Vertical3x4Context, blank_band_height, get_implementation, output_size,
    pad_vertical,
};
pub use crate::foundation::config::FilterConfig;
pub use crate::foundation::error::{FilterError, FilterResult};
pub use crate::foundation::format::{ColorFormat, FormatMask, Negotiated, SimdMask, negotiate};
pub use crate::host::runner::{FilterRunner, PixelFrame, RunnerOpts};
pub use crate::host::scaling::ScalingMode;
