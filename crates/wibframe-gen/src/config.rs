use wibframe_frame::layout::{CRATE_NO, FIBER_NO, SLOT_NO, VERSION};
use wibframe_frame::CrcKind;

use crate::error::{GenError, Result};

/// Largest value a 12-bit channel sample can hold.
const MAX_SAMPLE: u32 = 0xFFF;

/// Fixed fiber, slot and crate numbers stamped into every generated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub fiber_no: u8,
    pub slot_no: u8,
    pub crate_no: u8,
}

/// Generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Mean channel value. Default: 250.
    pub pedestal: u16,
    /// Half-width of the binomial noise. Default: 10.
    pub amplitude: u16,
    /// Probability that any single error flag is raised. Default: 1e-5.
    pub err_prob: f64,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Timestamp increment between consecutive frames. Default: 500.
    pub tick: u64,
    /// Timestamp of the first frame. `None` samples the wall clock in
    /// nanoseconds when the generator is built.
    pub start_timestamp: Option<u64>,
    /// Layout version written to the header. Default: 1.
    pub version: u8,
    /// Z mode flag. Default: false (63-bit timestamp).
    pub z: bool,
    /// Fixed identity. `None` draws random values per frame.
    pub identity: Option<Identity>,
    /// CRC flavour stamped into the trailer. Default: standard.
    pub crc: CrcKind,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pedestal: 250,
            amplitude: 10,
            err_prob: 1e-5,
            seed: None,
            tick: 500,
            start_timestamp: None,
            version: 1,
            z: false,
            identity: None,
            crc: CrcKind::Standard,
        }
    }
}

impl GeneratorConfig {
    /// Check that every generated value fits its field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.err_prob) {
            return Err(GenError::InvalidConfig(format!(
                "err_prob must be within [0, 1], got {}",
                self.err_prob
            )));
        }
        if u32::from(self.pedestal) + u32::from(self.amplitude) > MAX_SAMPLE {
            return Err(GenError::InvalidConfig(format!(
                "pedestal + amplitude must not exceed {MAX_SAMPLE}, got {} + {}",
                self.pedestal, self.amplitude
            )));
        }
        check_width("version", u32::from(self.version), VERSION.width())?;
        if let Some(identity) = self.identity {
            check_width("fiber_no", u32::from(identity.fiber_no), FIBER_NO.width())?;
            check_width("slot_no", u32::from(identity.slot_no), SLOT_NO.width())?;
            check_width("crate_no", u32::from(identity.crate_no), CRATE_NO.width())?;
        }
        Ok(())
    }
}

fn check_width(name: &str, value: u32, width: u32) -> Result<()> {
    if value >> width != 0 {
        return Err(GenError::InvalidConfig(format!(
            "{name} {value} does not fit in {width} bits"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GeneratorConfig::default();
        assert_eq!(config.pedestal, 250);
        assert_eq!(config.amplitude, 10);
        assert_eq!(config.tick, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn err_prob_out_of_range_is_rejected() {
        for err_prob in [-0.1, 1.5, f64::NAN] {
            let config = GeneratorConfig {
                err_prob,
                ..GeneratorConfig::default()
            };
            assert!(matches!(config.validate(), Err(GenError::InvalidConfig(_))));
        }
    }

    #[test]
    fn samples_must_fit_twelve_bits() {
        let config = GeneratorConfig {
            pedestal: 4000,
            amplitude: 95,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = GeneratorConfig {
            amplitude: 96,
            ..config
        };
        assert!(matches!(config.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn identity_values_must_fit_their_fields() {
        let mut config = GeneratorConfig {
            identity: Some(Identity {
                fiber_no: 7,
                slot_no: 31,
                crate_no: 7,
            }),
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_ok());

        config.identity = Some(Identity {
            fiber_no: 8,
            slot_no: 0,
            crate_no: 0,
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fiber_no 8"));

        config.identity = None;
        config.version = 32;
        assert!(matches!(config.validate(), Err(GenError::InvalidConfig(_))));
    }
}
