//! Vertical letterbox padding.
//!
//! Adds equal blank bands above and below the source so a narrow frame gains the height of a
//! 16:9 frame of the same width. Pixels are copied byte-wise, so every supported format goes
//! through the same path.

use smallvec::smallvec;

use crate::{
    filter::contract::{
        CreateParams, FilterDescriptor, FilterInstance, SOFTFILTER_API_VERSION, SoftFilter,
    },
    filter::packet::{FrameIo, Packets, WorkPacket, WorkUnit, WorkerSlot},
    foundation::error::{FilterError, FilterResult},
    foundation::format::{ColorFormat, FormatMask, SimdMask},
};

/// Extra rows needed to reach 16:9 from `height`, before rounding to an even count.
fn raw_padding(height: u32) -> u64 {
    let h = u64::from(height);
    (h << 4) / 9 - h
}

/// Rows of blank padding in each of the top and bottom bands.
pub fn blank_band_height(height: u32) -> u32 {
    // raw_padding(h) <= 7h / 9, so half of it always fits back into u32.
    (raw_padding(height) >> 1) as u32
}

/// Output dimensions for a `width` x `height` input.
///
/// Width is unchanged. Height grows by twice [`blank_band_height`], i.e. the raw padding
/// rounded down to an even number of rows.
pub fn output_size(width: u32, height: u32) -> (u32, u32) {
    let pad = raw_padding(height) & !1;
    let out_height = u64::from(height) + pad;
    (width, u32::try_from(out_height).unwrap_or(u32::MAX))
}

/// The Vertical3x4 filter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Vertical3x4;

impl Vertical3x4 {
    /// Identification metadata.
    pub const DESCRIPTOR: FilterDescriptor = FilterDescriptor {
        api_version: SOFTFILTER_API_VERSION,
        ident: "Vertical3x4",
        short_ident: "vertical3x4",
    };
}

/// Discovery entry point of the Vertical3x4 filter.
///
/// There is only a generic implementation, so `simd` does not influence the choice.
pub fn get_implementation(_simd: SimdMask) -> &'static dyn SoftFilter {
    static VERTICAL3X4: Vertical3x4 = Vertical3x4;
    &VERTICAL3X4
}

impl SoftFilter for Vertical3x4 {
    fn descriptor(&self) -> FilterDescriptor {
        Self::DESCRIPTOR
    }

    fn input_formats(&self) -> FormatMask {
        FormatMask::XRGB8888 | FormatMask::RGB565
    }

    fn output_formats(&self, input: FormatMask) -> FormatMask {
        input
    }

    fn create(&self, params: &CreateParams<'_>) -> FilterResult<Box<dyn FilterInstance>> {
        let ctx = Vertical3x4Context::new(params.in_fmt)?;
        tracing::debug!(
            requested = params.threads,
            granted = ctx.threads(),
            in_fmt = ?params.in_fmt,
            "vertical3x4 created"
        );
        Ok(Box::new(ctx))
    }
}

/// Per-activation state of [`Vertical3x4`].
///
/// Always grants a single thread: the padding pass writes the top band, the content and the
/// bottom band through one cursor.
#[derive(Debug)]
pub struct Vertical3x4Context {
    workers: Vec<WorkerSlot>,
    in_fmt: ColorFormat,
}

impl Vertical3x4Context {
    /// Allocate the context and its single worker slot.
    pub fn new(in_fmt: ColorFormat) -> FilterResult<Self> {
        let mut workers = Vec::new();
        workers.try_reserve_exact(1).map_err(|e| {
            FilterError::allocation(format!("vertical3x4 worker slot: {e}"))
        })?;
        workers.push(WorkerSlot::new(in_fmt));
        Ok(Self { workers, in_fmt })
    }

    /// Geometry recorded by the most recent [`FilterInstance::build_packets`] call.
    pub fn last_dispatch(&self) -> &WorkerSlot {
        &self.workers[0]
    }
}

impl FilterInstance for Vertical3x4Context {
    fn threads(&self) -> usize {
        self.workers.len()
    }

    fn input_format(&self) -> ColorFormat {
        self.in_fmt
    }

    fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        output_size(width, height)
    }

    fn build_packets<'a>(&mut self, io: FrameIo<'a>) -> Packets<'a> {
        let slot = &mut self.workers[0];
        *slot = WorkerSlot {
            dst_pitch: io.dst_pitch,
            src_pitch: io.src_pitch,
            format: self.in_fmt,
            width: io.width,
            height: io.height,
            first: true,
            last: true,
        };

        let unit = WorkUnit {
            dst: io.dst,
            src: io.src,
            slot: *slot,
        };
        smallvec![WorkPacket::new(pad_vertical, unit)]
    }
}

/// Work function: blank top band, content rows, blank bottom band.
///
/// Buffer sizes are a caller precondition. `src` must hold `src_pitch * height` bytes when the
/// pitches match, `dst` must hold `dst_pitch * output height` bytes; a short buffer panics on
/// the slice bound.
pub fn pad_vertical(unit: WorkUnit<'_>) {
    let WorkUnit { dst, src, slot } = unit;
    let rows = slot.height as usize;
    let band = blank_band_height(slot.height) as usize;
    let op = slot.dst_pitch;
    let ip = slot.src_pitch;

    let band_bytes = op * band;
    let content_bytes = op * rows;

    let (top, rest) = dst.split_at_mut(band_bytes);
    top.fill(0);

    let (content, rest) = rest.split_at_mut(content_bytes);
    if ip == op {
        content.copy_from_slice(&src[..content_bytes]);
    } else {
        // A wider source row would spill into the next destination row, which is overwritten
        // right after anyway; stop at the destination row instead.
        let row_bytes = ip.min(op);
        for y in 0..rows {
            let src_row = &src[y * ip..];
            let n = row_bytes.min(src_row.len());
            content[y * op..y * op + n].copy_from_slice(&src_row[..n]);
        }
    }

    rest[..band_bytes].fill(0);
}

#[cfg(test)]
#[path = "../../tests/unit/filters/vertical3x4.rs"]
mod tests;
