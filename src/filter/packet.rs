use smallvec::SmallVec;

use crate::foundation::format::ColorFormat;

/// Buffers and geometry of one frame, as handed to a filter's dispatch builder.
///
/// `src` holds `height` rows of `width` pixels spaced `src_pitch` bytes apart; `dst` must be sized
/// for the filter's [`output_size`](crate::FilterInstance::output_size) at `dst_pitch`.
#[derive(Debug)]
pub struct FrameIo<'a> {
    /// Output buffer, written by the packets.
    pub dst: &'a mut [u8],
    /// Output row stride in bytes.
    pub dst_pitch: usize,
    /// Input buffer.
    pub src: &'a [u8],
    /// Input row stride in bytes.
    pub src_pitch: usize,
    /// Input width in pixels.
    pub width: u32,
    /// Input height in pixels.
    pub height: u32,
}

/// Geometry of one worker's share of a frame.
///
/// A filter instance keeps one slot per granted thread and overwrites it on every dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerSlot {
    /// Output row stride in bytes.
    pub dst_pitch: usize,
    /// Input row stride in bytes.
    pub src_pitch: usize,
    /// Pixel encoding of the input.
    pub format: ColorFormat,
    /// Width in pixels of the input region.
    pub width: u32,
    /// Height in pixels of the input region.
    pub height: u32,
    /// This worker owns the first row band of the frame.
    pub first: bool,
    /// This worker owns the last row band of the frame.
    pub last: bool,
}

impl WorkerSlot {
    /// Empty slot for a freshly created instance.
    pub fn new(format: ColorFormat) -> Self {
        Self {
            dst_pitch: 0,
            src_pitch: 0,
            format,
            width: 0,
            height: 0,
            first: true,
            last: true,
        }
    }
}

/// One self-contained unit of pixel work: a [`WorkerSlot`] plus the buffers it reads and writes.
///
/// Built fresh per frame and consumed by value; buffers are borrowed only for that dispatch.
#[derive(Debug)]
pub struct WorkUnit<'a> {
    /// Destination rows for this unit.
    pub dst: &'a mut [u8],
    /// Source rows for this unit.
    pub src: &'a [u8],
    /// Geometry for this unit.
    pub slot: WorkerSlot,
}

/// Work function bound into a [`WorkPacket`].
pub type WorkFn = fn(WorkUnit<'_>);

/// A work function bound to its data, ready to run on any thread.
pub struct WorkPacket<'a> {
    work: WorkFn,
    unit: WorkUnit<'a>,
}

impl<'a> WorkPacket<'a> {
    /// Bind `work` to `unit`.
    pub fn new(work: WorkFn, unit: WorkUnit<'a>) -> Self {
        Self { work, unit }
    }

    /// Geometry this packet will process.
    pub fn slot(&self) -> &WorkerSlot {
        &self.unit.slot
    }

    /// Run the work function to completion.
    pub fn run(self) {
        (self.work)(self.unit)
    }
}

impl std::fmt::Debug for WorkPacket<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkPacket")
            .field("slot", &self.unit.slot)
            .field("dst_len", &self.unit.dst.len())
            .field("src_len", &self.unit.src.len())
            .finish_non_exhaustive()
    }
}

/// Packets emitted for one frame; one per granted thread, stored inline for the common single
/// thread case.
pub type Packets<'a> = SmallVec<[WorkPacket<'a>; 1]>;

#[cfg(test)]
#[path = "../../tests/unit/filter/packet.rs"]
mod tests;
