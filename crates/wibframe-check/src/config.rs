use wibframe_frame::CrcKind;

/// Validation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckConfig {
    /// CRC flavour the trailer is expected to hold. Default: standard.
    pub crc: CrcKind,
    /// Stop at the first hard error instead of reporting everything.
    /// Default: false.
    pub fail_fast: bool,
}
