/// How long a toast stays fully visible before fading out.
pub const TOAST_DISPLAY_MS: u64 = 3000;

/// Fade-out duration before the toast is removed.
pub const TOAST_FADE_MS: u64 = 300;

/// Severity of a transient notification.
///
/// Each kind maps to a fixed glyph and accent color in the toast overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
    Warning,
}

impl ToastKind {
    pub fn glyph(self) -> &'static str {
        match self {
            ToastKind::Success => "✔",
            ToastKind::Error => "✖",
            ToastKind::Warning => "⚠",
            ToastKind::Info => "ℹ",
        }
    }

    /// Stable identifier used by the UI to pick the accent color.
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping_is_fixed() {
        assert_eq!(ToastKind::Success.glyph(), "✔");
        assert_eq!(ToastKind::Error.glyph(), "✖");
        assert_eq!(ToastKind::Warning.glyph(), "⚠");
        assert_eq!(ToastKind::Info.glyph(), "ℹ");

        assert_eq!(ToastKind::Info.as_str(), "info");
        assert_eq!(ToastKind::Error.as_str(), "error");
    }

    #[test]
    fn test_timing_constants() {
        assert_eq!(TOAST_DISPLAY_MS, 3000);
        assert_eq!(TOAST_FADE_MS, 300);
    }
}
