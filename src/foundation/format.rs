use std::ops::{BitAnd, BitOr};

/// Pixel encoding of a framebuffer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    /// 32-bit packed RGB, the top byte unused.
    Xrgb8888,
    /// 16-bit packed RGB, 5/6/5 bits.
    Rgb565,
}

impl ColorFormat {
    /// Negotiation preference order: wider formats first.
    pub const PREFERRED: [ColorFormat; 2] = [ColorFormat::Xrgb8888, ColorFormat::Rgb565];

    /// Bytes per pixel for this encoding.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Xrgb8888 => 4,
            Self::Rgb565 => 2,
        }
    }

    /// The capability bit for this format.
    pub fn mask(self) -> FormatMask {
        match self {
            Self::Xrgb8888 => FormatMask::XRGB8888,
            Self::Rgb565 => FormatMask::RGB565,
        }
    }

    /// Byte length of one logical row of `width` pixels.
    pub fn row_bytes(self, width: u32) -> usize {
        (width as usize).saturating_mul(self.bytes_per_pixel())
    }
}

/// Bitmask of supported [`ColorFormat`]s, as exchanged during negotiation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct FormatMask(pub u32);

impl FormatMask {
    /// No formats.
    pub const NONE: FormatMask = FormatMask(0);
    /// 32-bit packed RGB.
    pub const XRGB8888: FormatMask = FormatMask(1 << 0);
    /// 16-bit packed RGB.
    pub const RGB565: FormatMask = FormatMask(1 << 1);
    /// Every format known to this crate.
    pub const ALL: FormatMask = FormatMask(Self::XRGB8888.0 | Self::RGB565.0);

    /// Return `true` when no bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Return `true` when `format` is part of this mask.
    pub fn contains(self, format: ColorFormat) -> bool {
        self.0 & format.mask().0 != 0
    }

    /// Formats in this mask, in [`ColorFormat::PREFERRED`] order.
    pub fn formats(self) -> impl Iterator<Item = ColorFormat> {
        ColorFormat::PREFERRED
            .into_iter()
            .filter(move |f| self.contains(*f))
    }

    /// Most preferred format in this mask.
    pub fn preferred(self) -> Option<ColorFormat> {
        self.formats().next()
    }
}

impl BitAnd for FormatMask {
    type Output = FormatMask;

    fn bitand(self, rhs: Self) -> Self::Output {
        FormatMask(self.0 & rhs.0)
    }
}

impl BitOr for FormatMask {
    type Output = FormatMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        FormatMask(self.0 | rhs.0)
    }
}

impl From<ColorFormat> for FormatMask {
    fn from(value: ColorFormat) -> Self {
        value.mask()
    }
}

/// CPU SIMD capabilities the host detected. Filters may pick a specialized implementation from it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SimdMask(pub u64);

/// Result of negotiating a filter's formats against what the host can provide and consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Negotiated {
    /// Format the host will feed into the filter.
    pub input: ColorFormat,
    /// Format the filter will write.
    pub output: ColorFormat,
}

/// Pick input and output formats from the filter's capability masks and the host's.
///
/// `output_formats` is the filter's mapping from an input format to the outputs it can produce.
/// The output keeps the input format whenever the filter and host allow it.
pub fn negotiate(
    filter_inputs: FormatMask,
    output_formats: impl Fn(FormatMask) -> FormatMask,
    host: FormatMask,
) -> Option<Negotiated> {
    for input in (filter_inputs & host).formats() {
        let outputs = output_formats(input.mask()) & host;
        if outputs.contains(input) {
            return Some(Negotiated {
                input,
                output: input,
            });
        }
        if let Some(output) = outputs.preferred() {
            return Some(Negotiated { input, output });
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/format.rs"]
mod tests;
