//! Decoding of the model's particle codes.
//!
//! Colored dark-sector partners carry codes `>= 9_000_000` whose last two
//! digits hold the color dimension and the two digits before that a spin code:
//! 1-2 scalar, 3-4 fermion, 5-6 vector.

use std::fmt;

use crate::domain::{FinalState, Process, Representation, SpinFamily};

const EXOTIC_THRESHOLD: i64 = 9_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParticleCodeError {
    #[error("particle code {0} is not a colored dark-sector particle (|code| < 9000000)")]
    NotExotic(i64),
    #[error("particle code {code} has invalid color digits {color}, must be 3, 6 or 8")]
    InvalidColor { code: i64, color: i64 },
    #[error("particle code {code} has invalid spin digits {spin}, must be 1..=6")]
    InvalidSpin { code: i64, spin: i64 },
}

/// A particle code as used by the model files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleCode(pub i64);

impl ParticleCode {
    pub fn is_exotic(self) -> bool {
        self.0.abs() >= EXOTIC_THRESHOLD
    }

    /// Raw color digits (`|code| % 100`).
    pub fn color_digits(self) -> i64 {
        self.0.abs() % 100
    }

    /// Raw spin digits (`(|code| / 100) % 100`).
    pub fn spin_digits(self) -> i64 {
        (self.0.abs() / 100) % 100
    }

    pub fn representation(self) -> Result<Representation, ParticleCodeError> {
        Representation::try_from(self.color_digits()).map_err(|_| ParticleCodeError::InvalidColor {
            code: self.0,
            color: self.color_digits(),
        })
    }

    pub fn spin_family(self) -> Result<SpinFamily, ParticleCodeError> {
        match self.spin_digits() {
            1 | 2 => Ok(SpinFamily::Scalar),
            3 | 4 => Ok(SpinFamily::Fermion),
            5 | 6 => Ok(SpinFamily::Vector),
            spin => Err(ParticleCodeError::InvalidSpin { code: self.0, spin }),
        }
    }

    /// Full decoding of an exotic code.
    pub fn decode(self) -> Result<DecodedParticle, ParticleCodeError> {
        if !self.is_exotic() {
            return Err(ParticleCodeError::NotExotic(self.0));
        }
        Ok(DecodedParticle {
            code: self,
            family: self.spin_family()?,
            rep: self.representation()?,
        })
    }
}

impl fmt::Display for ParticleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedParticle {
    pub code: ParticleCode,
    pub family: SpinFamily,
    pub rep: Representation,
}

impl DecodedParticle {
    /// Dispatcher process for the annihilation of a pair of these particles.
    pub fn process(&self, final_state: FinalState) -> Process {
        Process::new(self.family, final_state)
    }
}
