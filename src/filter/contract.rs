use std::any::Any;
use std::sync::Arc;

use crate::{
    filter::packet::{FrameIo, Packets},
    foundation::config::FilterConfig,
    foundation::error::FilterResult,
    foundation::format::{ColorFormat, FormatMask, SimdMask},
};

/// Version of the filter contract implemented by this crate.
pub const SOFTFILTER_API_VERSION: u32 = 2;

/// Identification metadata a host uses to list and select filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterDescriptor {
    /// Contract version the filter was written against.
    pub api_version: u32,
    /// Human readable name.
    pub ident: &'static str,
    /// Short machine identifier, e.g. for config files.
    pub short_ident: &'static str,
}

/// Arguments for activating a filter.
///
/// Formats are the outcome of negotiation against [`SoftFilter::input_formats`] and
/// [`SoftFilter::output_formats`]; filters accept them without further checks.
#[derive(Clone)]
pub struct CreateParams<'a> {
    /// Filter parameters.
    pub config: &'a FilterConfig,
    /// Negotiated input format.
    pub in_fmt: ColorFormat,
    /// Negotiated output format.
    pub out_fmt: ColorFormat,
    /// Largest input width the host will dispatch.
    pub max_width: u32,
    /// Largest input height the host will dispatch.
    pub max_height: u32,
    /// Worker threads the host would like to use. The instance reports what it grants.
    pub threads: usize,
    /// SIMD capabilities detected by the host.
    pub simd: SimdMask,
    /// Opaque host data, handed back untouched.
    pub user_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for CreateParams<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateParams")
            .field("config", &self.config)
            .field("in_fmt", &self.in_fmt)
            .field("out_fmt", &self.out_fmt)
            .field("max_width", &self.max_width)
            .field("max_height", &self.max_height)
            .field("threads", &self.threads)
            .field("simd", &self.simd)
            .field("user_data", &self.user_data.is_some())
            .finish()
    }
}

/// A software filter implementation: capability queries plus a factory for activations.
///
/// Implementations are stateless; all per-activation state lives in the [`FilterInstance`]
/// returned by [`SoftFilter::create`].
pub trait SoftFilter: Send + Sync {
    /// Identification metadata.
    fn descriptor(&self) -> FilterDescriptor;

    /// Formats this filter accepts as input.
    fn input_formats(&self) -> FormatMask;

    /// Formats this filter can write given the offered `input` formats.
    fn output_formats(&self, input: FormatMask) -> FormatMask;

    /// Activate the filter. Fails only when the instance state cannot be allocated.
    fn create(&self, params: &CreateParams<'_>) -> FilterResult<Box<dyn FilterInstance>>;
}

/// One activation of a [`SoftFilter`]. Dropping it releases all of its state.
pub trait FilterInstance: Send {
    /// Number of packets the instance emits per frame.
    ///
    /// Authoritative: a dispatcher must never run more workers than this, whatever it asked for
    /// at creation.
    fn threads(&self) -> usize;

    /// Input format negotiated at creation.
    fn input_format(&self) -> ColorFormat;

    /// Output dimensions for an input of `width` x `height`. Hosts size destination buffers
    /// from this before dispatching.
    fn output_size(&self, width: u32, height: u32) -> (u32, u32);

    /// Bind this frame's buffers into work packets, one per granted thread.
    ///
    /// Takes `&mut self`: the instance rewrites its worker slots on every call, so a single
    /// orchestration thread drives dispatch.
    fn build_packets<'a>(&mut self, io: FrameIo<'a>) -> Packets<'a>;
}
