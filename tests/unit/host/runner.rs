use super::*;
use crate::filter::packet::{WorkPacket, WorkUnit, WorkerSlot};
use crate::filter::registry::FilterKind;
use std::sync::atomic::{AtomicUsize, Ordering};

fn vertical3x4() -> &'static dyn SoftFilter {
    FilterKind::Vertical3x4.implementation(SimdMask::default())
}

fn opts(host_formats: FormatMask, threads: Option<usize>) -> RunnerOpts {
    RunnerOpts {
        host_formats,
        threads,
        max_width: 640,
        max_height: 480,
        ..RunnerOpts::default()
    }
}

fn gradient(width: u32, height: u32, format: ColorFormat) -> PixelFrame {
    let mut f = PixelFrame::new(width, height, format);
    for (i, b) in f.data.iter_mut().enumerate() {
        *b = (i % 251) as u8 | 1;
    }
    f
}

#[test]
fn negotiates_preferred_shared_format() {
    let cfg = FilterConfig::new();
    let r = FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::ALL, Some(1))).unwrap();
    assert_eq!(r.formats().input, ColorFormat::Xrgb8888);
    assert_eq!(r.formats().output, ColorFormat::Xrgb8888);

    let r = FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::RGB565, Some(1))).unwrap();
    assert_eq!(r.formats().input, ColorFormat::Rgb565);
    assert_eq!(r.descriptor().short_ident, "vertical3x4");
}

#[test]
fn no_shared_format_is_rejected() {
    let cfg = FilterConfig::new();
    let err = FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::NONE, Some(1))).unwrap_err();
    assert!(matches!(err, FilterError::Validation(_)));
}

#[test]
fn zero_threads_is_rejected() {
    let cfg = FilterConfig::new();
    assert!(FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::ALL, Some(0))).is_err());
}

#[test]
fn granted_threads_override_request() {
    let cfg = FilterConfig::new();
    for requested in [Some(1), Some(2), Some(4), Some(16), None] {
        let r = FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::ALL, requested)).unwrap();
        assert_eq!(r.threads(), 1);
        assert!(r.pool.is_none());
    }
}

#[test]
fn process_pads_frame() {
    let cfg = FilterConfig::new();
    let mut r = FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::RGB565, None)).unwrap();
    let src = gradient(320, 240, ColorFormat::Rgb565);
    let out = r.process(&src).unwrap();

    assert_eq!((out.width, out.height), (320, 426));
    assert_eq!(out.pitch, 640);
    for y in 0..93 {
        assert!(out.row(y).iter().all(|&b| b == 0));
        assert!(out.row(333 + y).iter().all(|&b| b == 0));
    }
    for y in 0..240 {
        assert_eq!(out.row(93 + y), src.row(y));
    }
}

#[test]
fn process_rejects_wrong_format_and_oversized_frames() {
    let cfg = FilterConfig::new();
    let mut r = FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::RGB565, None)).unwrap();

    let err = r
        .process(&PixelFrame::new(4, 4, ColorFormat::Xrgb8888))
        .unwrap_err();
    assert!(err.to_string().contains("does not match"));

    let err = r
        .process(&PixelFrame::new(641, 4, ColorFormat::Rgb565))
        .unwrap_err();
    assert!(err.to_string().contains("exceeds"));
}

#[test]
fn huge_frames_are_rejected_before_allocating_output() {
    let cfg = FilterConfig::new();
    let mut r = FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::XRGB8888, None)).unwrap();

    let huge = PixelFrame {
        width: u32::MAX,
        height: u32::MAX,
        pitch: 0,
        format: ColorFormat::Xrgb8888,
        data: Vec::new(),
    };
    let err = r.process(&huge).unwrap_err();
    assert!(matches!(err, FilterError::Validation(_)));
    assert!(err.to_string().contains("exceeds"));

    let tall = PixelFrame {
        width: 641,
        height: 100_000,
        pitch: 0,
        format: ColorFormat::Xrgb8888,
        data: Vec::new(),
    };
    assert!(matches!(r.process(&tall), Err(FilterError::Validation(_))));
}

#[test]
fn try_new_reports_size_overflow() {
    let err = PixelFrame::try_new(u32::MAX, u32::MAX, ColorFormat::Xrgb8888);
    assert!(matches!(err, Err(FilterError::Validation(_))));
    let f = PixelFrame::try_new(3, 2, ColorFormat::Rgb565).unwrap();
    assert_eq!((f.pitch, f.data.len()), (6, 12));
}

#[test]
#[should_panic]
fn row_out_of_range_panics() {
    let f = PixelFrame::new(2, 2, ColorFormat::Rgb565);
    let _ = f.row(2);
}

#[test]
fn process_into_checks_buffers_before_dispatch() {
    let cfg = FilterConfig::new();
    let mut r = FilterRunner::new(vertical3x4(), &cfg, &opts(FormatMask::RGB565, None)).unwrap();
    let src = vec![1u8; 8 * 10];

    // Destination one row short of 16 rows.
    let mut dst = vec![0xFFu8; 8 * 15];
    let err = r.process_into(&src, 4, 10, 8, &mut dst, 8).unwrap_err();
    assert!(err.to_string().contains("destination buffer"));
    assert!(dst.iter().all(|&b| b == 0xFF));

    // Pitch narrower than a row.
    let mut dst = vec![0u8; 8 * 16];
    let err = r.process_into(&src, 4, 10, 6, &mut dst, 8).unwrap_err();
    assert!(err.to_string().contains("source pitch"));

    let mut dst = vec![0xFFu8; 8 * 16];
    r.process_into(&src, 4, 10, 8, &mut dst, 8).unwrap();
    assert!(dst[..24].iter().all(|&b| b == 0));
    assert!(dst[24..104].iter().all(|&b| b == 1));
    assert!(dst[104..].iter().all(|&b| b == 0));
}

static ROWS_DONE: AtomicUsize = AtomicUsize::new(0);

fn count_rows(unit: WorkUnit<'_>) {
    let WorkUnit { dst, src, slot } = unit;
    let n = slot.height as usize * slot.dst_pitch;
    dst[..n].copy_from_slice(&src[..n]);
    ROWS_DONE.fetch_add(slot.height as usize, Ordering::SeqCst);
}

/// Splits frames into `threads` row bands, the way a parallel filter would.
struct Banded {
    threads: usize,
}

impl FilterInstance for Banded {
    fn threads(&self) -> usize {
        self.threads
    }

    fn input_format(&self) -> ColorFormat {
        ColorFormat::Xrgb8888
    }

    fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width, height)
    }

    fn build_packets<'a>(&mut self, io: FrameIo<'a>) -> Packets<'a> {
        let rows = (io.height as usize).div_ceil(self.threads);
        let mut out = Packets::new();
        let bands = io
            .dst
            .chunks_mut(rows * io.dst_pitch)
            .zip(io.src.chunks(rows * io.src_pitch));
        let n = bands.len();
        for (i, (dst, src)) in bands.enumerate() {
            let slot = WorkerSlot {
                dst_pitch: io.dst_pitch,
                src_pitch: io.src_pitch,
                format: ColorFormat::Xrgb8888,
                width: io.width,
                height: (dst.len() / io.dst_pitch) as u32,
                first: i == 0,
                last: i + 1 == n,
            };
            out.push(WorkPacket::new(count_rows, WorkUnit { dst, src, slot }));
        }
        out
    }
}

struct BandedFilter;

impl SoftFilter for BandedFilter {
    fn descriptor(&self) -> FilterDescriptor {
        FilterDescriptor {
            api_version: crate::SOFTFILTER_API_VERSION,
            ident: "Banded copy",
            short_ident: "banded",
        }
    }

    fn input_formats(&self) -> FormatMask {
        FormatMask::XRGB8888
    }

    fn output_formats(&self, input: FormatMask) -> FormatMask {
        input
    }

    fn create(&self, params: &CreateParams<'_>) -> FilterResult<Box<dyn FilterInstance>> {
        Ok(Box::new(Banded {
            threads: params.threads.min(4),
        }))
    }
}

#[test]
fn multi_packet_filters_run_on_pool() {
    let cfg = FilterConfig::new();
    let mut r = FilterRunner::new(&BandedFilter, &cfg, &opts(FormatMask::ALL, Some(16))).unwrap();
    assert_eq!(r.threads(), 4);
    assert!(r.pool.is_some());

    let src = gradient(8, 20, ColorFormat::Xrgb8888);
    let before = ROWS_DONE.load(Ordering::SeqCst);
    let out = r.process(&src).unwrap();
    assert_eq!(out, src);
    assert_eq!(ROWS_DONE.load(Ordering::SeqCst) - before, 20);
}

#[test]
fn runner_opts_deserialize_with_defaults() {
    let o: RunnerOpts = serde_json::from_str(r#"{ "host_formats": 2, "threads": 3 }"#).unwrap();
    assert_eq!(o.host_formats, FormatMask::RGB565);
    assert_eq!(o.threads, Some(3));
    assert_eq!(o.max_width, RunnerOpts::default().max_width);
}
