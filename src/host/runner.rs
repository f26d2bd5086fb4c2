use crate::{
    filter::contract::{CreateParams, FilterDescriptor, FilterInstance, SoftFilter},
    filter::packet::{FrameIo, Packets},
    foundation::config::FilterConfig,
    foundation::error::{FilterError, FilterResult},
    foundation::format::{ColorFormat, FormatMask, Negotiated, SimdMask, negotiate},
};

/// Host-side settings for driving a filter.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RunnerOpts {
    /// Formats the host can feed in and read back.
    pub host_formats: FormatMask,
    /// Worker threads to request. `None` uses rayon's current thread count.
    pub threads: Option<usize>,
    /// Largest input width that will be dispatched.
    pub max_width: u32,
    /// Largest input height that will be dispatched.
    pub max_height: u32,
    /// SIMD capabilities passed through to the filter.
    pub simd: SimdMask,
}

impl Default for RunnerOpts {
    fn default() -> Self {
        Self {
            host_formats: FormatMask::ALL,
            threads: None,
            max_width: 4096,
            max_height: 4096,
            simd: SimdMask::default(),
        }
    }
}

/// An owned frame: `height` rows of `width` pixels spaced `pitch` bytes apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row stride in bytes.
    pub pitch: usize,
    /// Pixel encoding.
    pub format: ColorFormat,
    /// Pixel bytes, row-major.
    pub data: Vec<u8>,
}

impl PixelFrame {
    /// Zeroed frame with tightly packed rows.
    ///
    /// # Panics
    ///
    /// Panics if the buffer size overflows `usize`; see [`PixelFrame::try_new`].
    pub fn new(width: u32, height: u32, format: ColorFormat) -> Self {
        let pitch = format.row_bytes(width);
        Self {
            width,
            height,
            pitch,
            format,
            data: vec![0; pitch * height as usize],
        }
    }

    /// Zeroed frame with tightly packed rows, failing instead of overflowing on huge sizes.
    pub fn try_new(width: u32, height: u32, format: ColorFormat) -> FilterResult<Self> {
        let pitch = format
            .bytes_per_pixel()
            .checked_mul(width as usize)
            .ok_or_else(|| FilterError::validation(format!("frame width {width} overflows")))?;
        let len = pitch.checked_mul(height as usize).ok_or_else(|| {
            FilterError::validation(format!("frame {width}x{height} size overflows"))
        })?;
        Ok(Self {
            width,
            height,
            pitch,
            format,
            data: vec![0; len],
        })
    }

    /// Bytes of row `y`, without the stride padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height` or `data` is shorter than `height` rows.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.pitch;
        &self.data[start..start + self.format.row_bytes(self.width)]
    }
}

/// Drives one activation of a [`SoftFilter`]: negotiation, creation, buffer checks and packet
/// execution.
///
/// The worker pool is sized from [`FilterInstance::threads`], never from the requested count.
pub struct FilterRunner {
    descriptor: FilterDescriptor,
    formats: Negotiated,
    max_width: u32,
    max_height: u32,
    instance: Box<dyn FilterInstance>,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for FilterRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRunner")
            .field("descriptor", &self.descriptor)
            .field("formats", &self.formats)
            .field("threads", &self.instance.threads())
            .finish_non_exhaustive()
    }
}

impl FilterRunner {
    /// Negotiate formats with `filter` and activate it.
    #[tracing::instrument(skip(filter, config), fields(filter = filter.descriptor().short_ident))]
    pub fn new(
        filter: &dyn SoftFilter,
        config: &FilterConfig,
        opts: &RunnerOpts,
    ) -> FilterResult<Self> {
        let descriptor = filter.descriptor();
        let formats = negotiate(
            filter.input_formats(),
            |m| filter.output_formats(m),
            opts.host_formats,
        )
        .ok_or_else(|| {
            FilterError::validation(format!(
                "filter '{}' shares no color format with host mask {:#x}",
                descriptor.short_ident, opts.host_formats.0
            ))
        })?;

        let requested = match opts.threads {
            Some(0) => {
                return Err(FilterError::validation(
                    "runner 'threads' must be >= 1 when set",
                ));
            }
            Some(n) => n,
            None => rayon::current_num_threads(),
        };

        let instance = filter.create(&CreateParams {
            config,
            in_fmt: formats.input,
            out_fmt: formats.output,
            max_width: opts.max_width,
            max_height: opts.max_height,
            threads: requested,
            simd: opts.simd,
            user_data: None,
        })?;

        let granted = instance.threads();
        if granted == 0 {
            return Err(FilterError::validation(format!(
                "filter '{}' granted zero threads",
                descriptor.short_ident
            )));
        }
        if granted < requested {
            tracing::debug!(requested, granted, "filter narrowed thread count");
        }
        let pool = if granted > 1 {
            Some(build_thread_pool(granted)?)
        } else {
            None
        };

        tracing::debug!(
            input = ?formats.input,
            output = ?formats.output,
            granted,
            "filter activated"
        );

        Ok(Self {
            descriptor,
            formats,
            max_width: opts.max_width,
            max_height: opts.max_height,
            instance,
            pool,
        })
    }

    /// Identification of the running filter.
    pub fn descriptor(&self) -> FilterDescriptor {
        self.descriptor
    }

    /// Negotiated input and output formats.
    pub fn formats(&self) -> Negotiated {
        self.formats
    }

    /// Threads granted by the filter.
    pub fn threads(&self) -> usize {
        self.instance.threads()
    }

    /// Output dimensions for an input of `width` x `height`.
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        self.instance.output_size(width, height)
    }

    /// Filter `src` into a freshly allocated, tightly packed frame.
    pub fn process(&mut self, src: &PixelFrame) -> FilterResult<PixelFrame> {
        if src.format != self.formats.input {
            return Err(FilterError::validation(format!(
                "frame format {:?} does not match negotiated input {:?}",
                src.format, self.formats.input
            )));
        }
        self.check_dimensions(src.width, src.height)?;
        let (out_w, out_h) = self.output_size(src.width, src.height);
        let mut out = PixelFrame::try_new(out_w, out_h, self.formats.output)?;
        let dst_pitch = out.pitch;
        self.process_into(
            &src.data,
            src.width,
            src.height,
            src.pitch,
            &mut out.data,
            dst_pitch,
        )?;
        Ok(out)
    }

    /// Filter `src` into the caller's `dst`.
    ///
    /// Checks dimensions against the activation maximums and both buffers against their pitch and
    /// row count before any packet runs.
    pub fn process_into(
        &mut self,
        src: &[u8],
        width: u32,
        height: u32,
        src_pitch: usize,
        dst: &mut [u8],
        dst_pitch: usize,
    ) -> FilterResult<()> {
        self.check_dimensions(width, height)?;
        let (out_w, out_h) = self.output_size(width, height);
        check_buffer("source", src.len(), src_pitch, self.formats.input, width, height)?;
        check_buffer("destination", dst.len(), dst_pitch, self.formats.output, out_w, out_h)?;

        let packets = self.instance.build_packets(FrameIo {
            dst,
            dst_pitch,
            src,
            src_pitch,
            width,
            height,
        });
        let granted = self.instance.threads();
        if packets.len() > granted {
            return Err(FilterError::validation(format!(
                "filter emitted {} packets for {granted} granted threads",
                packets.len()
            )));
        }

        tracing::trace!(width, height, packets = packets.len(), "dispatch");
        self.run_packets(packets);
        Ok(())
    }

    fn check_dimensions(&self, width: u32, height: u32) -> FilterResult<()> {
        if width > self.max_width || height > self.max_height {
            return Err(FilterError::validation(format!(
                "frame {width}x{height} exceeds activation maximum {}x{}",
                self.max_width, self.max_height
            )));
        }
        Ok(())
    }

    fn run_packets(&self, packets: Packets<'_>) {
        match &self.pool {
            Some(pool) if packets.len() > 1 => pool.install(|| {
                rayon::scope(|s| {
                    for p in packets {
                        s.spawn(move |_| p.run());
                    }
                })
            }),
            _ => packets.into_iter().for_each(|p| p.run()),
        }
    }
}

fn check_buffer(
    what: &str,
    len: usize,
    pitch: usize,
    format: ColorFormat,
    width: u32,
    height: u32,
) -> FilterResult<()> {
    let row = format.row_bytes(width);
    if pitch < row {
        return Err(FilterError::validation(format!(
            "{what} pitch {pitch} is smaller than a {width} px row ({row} bytes)"
        )));
    }
    let needed = pitch
        .checked_mul(height as usize)
        .ok_or_else(|| FilterError::validation(format!("{what} buffer size overflow")))?;
    if len < needed {
        return Err(FilterError::validation(format!(
            "{what} buffer holds {len} bytes, {needed} required"
        )));
    }
    Ok(())
}

fn build_thread_pool(threads: usize) -> FilterResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("softfilter-{i}"))
        .build()
        .map_err(|e| FilterError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/host/runner.rs"]
mod tests;
