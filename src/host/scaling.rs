/// Display scaling state toggled by the fullscreen hotkey.
///
/// Field names match the frontend setting keys so the host can store them as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScalingMode {
    /// Scale only by whole multiples of the source size.
    #[serde(rename = "video_scale_integer")]
    pub integer_scale: bool,
    /// Keep the core's original aspect ratio instead of forcing 4:3.
    #[serde(rename = "video_dingux_ipu_keep_aspect")]
    pub keep_aspect: bool,
}

impl ScalingMode {
    /// Next state of the four-state cycle.
    ///
    /// `keep_aspect` flips every time; `integer_scale` flips whenever `keep_aspect` turns on.
    pub fn toggled(self) -> Self {
        let keep_aspect = !self.keep_aspect;
        let integer_scale = if keep_aspect {
            !self.integer_scale
        } else {
            self.integer_scale
        };
        Self {
            integer_scale,
            keep_aspect,
        }
    }

    /// On-screen status text, e.g. `Integer scaling: ON (4:3) - 640x480`.
    ///
    /// An unknown display resolution prints as `0x0`.
    pub fn status_message(self, resolution: Option<(u32, u32)>) -> String {
        let (w, h) = resolution.unwrap_or((0, 0));
        format!(
            "Integer scaling: {} ({}) - {w}x{h}",
            if self.integer_scale { "ON" } else { "OFF" },
            if self.keep_aspect { "Original" } else { "4:3" },
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/scaling.rs"]
mod tests;
