//! Whole notes → LilyPond durations
//!
//! A duration in whole notes is written as a power-of-two base, dots and
//! an optional multiplier: `3/4` is `2.`, `5/8` is `8*5`, `6` is
//! `\breve*3`. Values whose denominator is not a power of two up to 128
//! are written `1*n/d`.

use crate::errors::{InternalError, SourceLocation, TranslationError};
use crate::rational::Rational;
use serde::Serialize;
use std::fmt;

/// Numerators that a dotted power of two reduces to: 2^(dots+1) - 1
const DOTTED_NUMERATORS: [i64; 7] = [1, 3, 7, 15, 31, 63, 127];

/// Largest denominator written as a plain base
const MAX_DENOMINATOR_LOG: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotatedDuration {
    base: String,
    dots: u32,
    multiplier: Rational,
}

impl NotatedDuration {
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn dots(&self) -> u32 {
        self.dots
    }

    pub fn multiplier(&self) -> Rational {
        self.multiplier
    }

    /// Same duration scaled by `factor`, e.g. `8*2/3` in figure mode
    pub fn scaled(&self, factor: Rational) -> Self {
        Self {
            base: self.base.clone(),
            dots: self.dots,
            multiplier: (self.multiplier * factor).rationalised(),
        }
    }
}

impl fmt::Display for NotatedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, ".".repeat(self.dots as usize))?;
        if self.multiplier != Rational::one() {
            write!(f, "*{}", self.multiplier)?;
        }
        Ok(())
    }
}

fn dots_for_numerator(numerator: i64) -> i32 {
    DOTTED_NUMERATORS
        .iter()
        .position(|&n| n == numerator)
        .map_or(-1, |dots| dots as i32)
}

fn power_of_two_log(value: i64) -> Option<u32> {
    (value > 0 && value & (value - 1) == 0).then(|| value.trailing_zeros())
}

/// Express `whole_notes` as a LilyPond duration.
///
/// Only positive values have a notation; anything else means an earlier
/// pass produced a bad duration.
pub fn whole_notes_as_notated_duration(
    location: &SourceLocation,
    whole_notes: Rational,
) -> Result<NotatedDuration, TranslationError> {
    if whole_notes.numerator() <= 0 {
        return Err(InternalError::NonPositiveWholeNotes {
            location: location.clone(),
            whole_notes: whole_notes.to_string(),
        }
        .into());
    }

    let reduced = whole_notes.rationalised();
    let mut numerator = reduced.numerator();
    let denominator = reduced.denominator();
    let mut dots = dots_for_numerator(numerator);

    let Some(denominator_log) = power_of_two_log(denominator).filter(|l| *l <= MAX_DENOMINATOR_LOG)
    else {
        return Ok(NotatedDuration {
            base: "1".to_string(),
            dots: 0,
            multiplier: reduced,
        });
    };
    let mut log = denominator_log as i32;

    if denominator == 1 {
        while numerator % 2 == 0 {
            numerator /= 2;
            log -= 1;
        }
        dots = dots_for_numerator(numerator);
    }

    let mut multiplier = Rational::one();
    if dots >= 0 && log >= dots {
        log -= dots;
    } else {
        multiplier = Rational::from_integer(numerator);
        dots = 0;
    }

    let base = match log {
        -1 => "\\breve".to_string(),
        -2 => "\\longa".to_string(),
        -3 => "\\maxima".to_string(),
        l if l < -3 => {
            multiplier = (multiplier * (1_i64 << (-3 - l))).rationalised();
            "\\maxima".to_string()
        }
        l => (1_i64 << l).to_string(),
    };

    Ok(NotatedDuration {
        base,
        dots: dots as u32,
        multiplier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notate(numerator: i64, denominator: i64) -> String {
        whole_notes_as_notated_duration(&SourceLocation::new("durations", 1), Rational::new(numerator, denominator))
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_dotted_values() {
        let notated =
            whole_notes_as_notated_duration(&SourceLocation::new("durations", 1), Rational::new(3, 4)).unwrap();
        assert_eq!(notated.to_string(), "2.");
        assert_eq!(notated.dots(), 1);
        assert_eq!(notated.multiplier(), Rational::one());

        assert_eq!(notate(7, 16), "4..");
        assert_eq!(notate(15, 16), "2...");
        assert_eq!(notate(3, 2), "1.");
    }

    #[test]
    fn test_power_of_two_grid() {
        // {1,3,7,15,31,63,127} / 2^k for every k that leaves room for the dots
        for (dots, numerator) in DOTTED_NUMERATORS.iter().enumerate() {
            for k in dots as u32..=MAX_DENOMINATOR_LOG {
                let denominator = 1_i64 << k;
                let expected = format!("{}{}", 1_i64 << (k as usize - dots), ".".repeat(dots));
                assert_eq!(notate(*numerator, denominator), expected, "{}/{}", numerator, denominator);
            }
        }
    }

    #[test]
    fn test_multiplying_factor() {
        let notated =
            whole_notes_as_notated_duration(&SourceLocation::new("durations", 1), Rational::new(5, 8)).unwrap();
        assert_eq!(notated.to_string(), "8*5");
        assert_eq!(notated.multiplier(), Rational::from_integer(5));
        assert_eq!(notated.dots(), 0);
        assert_eq!(notate(1, 12), "1*1/12");
        assert_eq!(notate(3, 1), "1*3");
    }

    #[test]
    fn test_unreduced_input_is_rationalised() {
        assert_eq!(notate(2, 8), "4");
        assert_eq!(notate(6, 8), "2.");
    }

    #[test]
    fn test_long_values() {
        assert_eq!(notate(2, 1), "\\breve");
        assert_eq!(notate(4, 1), "\\longa");
        assert_eq!(notate(8, 1), "\\maxima");
        assert_eq!(notate(16, 1), "\\maxima*2");
        assert_eq!(notate(6, 1), "\\breve*3");
    }

    #[test]
    fn test_non_positive_is_internal_error() {
        for value in [Rational::zero(), Rational::new(-1, 4)] {
            assert!(matches!(
                whole_notes_as_notated_duration(&SourceLocation::new("durations", 9), value),
                Err(TranslationError::Internal(InternalError::NonPositiveWholeNotes { .. }))
            ));
        }
    }

    #[test]
    fn test_scaled_for_tuplets() {
        let eighth =
            whole_notes_as_notated_duration(&SourceLocation::new("durations", 1), Rational::new(1, 8)).unwrap();
        assert_eq!(eighth.scaled(Rational::new(2, 3)).to_string(), "8*2/3");
    }
}
