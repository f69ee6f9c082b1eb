//! LOC (RFC 1876) presentation codec.
//!
//! Parses strings of the form
//!
//! ```text
//! d1 [m1 [s1]] {N|S} d2 [m2 [s2]] {E|W} alt[m] [siz[m] [hp[m] [vp[m]]]]
//! ```
//!
//! into the packed fields carried on the wire, and formats packed fields
//! back into the same grammar.
//!
//! Examples of accepted input:
//!
//! ```text
//! 42 21 54 N 71 06 18 W -24m 30m
//! 42 21 43.952 N 71 5 6.344 W -24m 1m 200m
//! 59 N 10 E 15.0 30.0 2000.0 5.0
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Latitude of the equator in thousandths of an arc second.
pub const LOC_EQUATOR: u32 = 1 << 31;
/// Longitude of the prime meridian in thousandths of an arc second.
pub const LOC_PRIMEMERIDIAN: u32 = 1 << 31;
/// Thousandths of an arc second per degree.
pub const LOC_DEGREES: u32 = 3_600_000;
/// Thousandths of an arc second per arc minute.
pub const LOC_MINUTES: u32 = 60_000;
/// Altitude reference: 100 000 m below the WGS 84 spheroid, in metres.
pub const LOC_ALTITUDE_BASE: f64 = 100_000.0;
/// Highest representable altitude in metres.
pub const LOC_ALTITUDE_MAX: f64 = 42_849_672.95;
/// Largest size or precision accepted, in metres.
pub const LOC_PRECISION_MAX: f64 = 90_000_000.0;

/// Default size: 1 m.
pub const DEFAULT_SIZE: u8 = 0x12;
/// Default horizontal precision: 10 000 m.
pub const DEFAULT_HORIZONTAL_PRECISION: u8 = 0x16;
/// Default vertical precision: 10 m.
pub const DEFAULT_VERTICAL_PRECISION: u8 = 0x13;

const DEGREES: &str = r"(\d+)(?: (\d+))?(?: (\d+(?:\.\d+)?))?";
const METRES: &str = r"(?: (-?\d+(?:\.\d+)?)m?)";

static LOC_GRAMMAR: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{DEGREES} (N|S) {DEGREES} (E|W){METRES}{METRES}?{METRES}?{METRES}?$"
    ))
});

/// Packed LOC record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Loc {
    pub version: u8,
    pub size: u8,
    pub horizontal_precision: u8,
    pub vertical_precision: u8,
    pub latitude: u32,
    pub longitude: u32,
    pub altitude: u32,
}

impl Loc {
    /// Parse a presentation string, stamping the given version.
    pub fn parse(input: &str, version: u8) -> Result<Self> {
        let grammar = LOC_GRAMMAR
            .as_ref()
            .map_err(|e| CoreError::Loc(e.to_string()))?;
        let caps = grammar
            .captures(input.trim())
            .ok_or_else(|| CoreError::Loc(format!("'{input}' does not match the LOC grammar")))?;
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        let latitude = arc_offset(group(1), group(2), group(3), 90)?;
        let latitude = if group(4) == "N" {
            LOC_EQUATOR + latitude
        } else {
            LOC_EQUATOR - latitude
        };

        let longitude = arc_offset(group(5), group(6), group(7), 180)?;
        let longitude = if group(8) == "E" {
            LOC_PRIMEMERIDIAN + longitude
        } else {
            LOC_PRIMEMERIDIAN - longitude
        };

        Ok(Self {
            version,
            size: size_precision(group(10), DEFAULT_SIZE)?,
            horizontal_precision: size_precision(group(11), DEFAULT_HORIZONTAL_PRECISION)?,
            vertical_precision: size_precision(group(12), DEFAULT_VERTICAL_PRECISION)?,
            latitude,
            longitude,
            altitude: altitude(group(9))?,
        })
    }
}

impl FromStr for Loc {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, 0)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lat, ns) = if self.latitude > LOC_EQUATOR {
            (self.latitude - LOC_EQUATOR, 'N')
        } else {
            (LOC_EQUATOR - self.latitude, 'S')
        };
        let (lon, ew) = if self.longitude > LOC_PRIMEMERIDIAN {
            (self.longitude - LOC_PRIMEMERIDIAN, 'E')
        } else {
            (LOC_PRIMEMERIDIAN - self.longitude, 'W')
        };
        write_arc(f, lat, ns)?;
        f.write_str(" ")?;
        write_arc(f, lon, ew)?;

        let cm = i64::from(self.altitude) - 10_000_000;
        let sign = if cm < 0 { "-" } else { "" };
        let (whole, frac) = (cm.abs() / 100, cm.abs() % 100);
        if frac == 0 {
            write!(f, " {sign}{whole}m")?;
        } else {
            write!(f, " {sign}{whole}.{frac:02}m")?;
        }

        write!(
            f,
            " {}m {}m {}m",
            cm_to_m(self.size),
            cm_to_m(self.horizontal_precision),
            cm_to_m(self.vertical_precision)
        )
    }
}

fn write_arc(f: &mut fmt::Formatter<'_>, offset: u32, hemisphere: char) -> fmt::Result {
    let degrees = offset / LOC_DEGREES;
    let minutes = (offset % LOC_DEGREES) / LOC_MINUTES;
    let millis = offset % LOC_MINUTES;
    write!(
        f,
        "{degrees:02} {minutes:02} {}.{:03} {hemisphere}",
        millis / 1000,
        millis % 1000
    )
}

/// Render a packed size/precision byte in metres.
fn cm_to_m(packed: u8) -> String {
    let mantissa = packed >> 4;
    let exponent = packed & 0x0f;
    match exponent {
        0 => format!("0.{mantissa:02}"),
        1 => format!("0.{:02}", mantissa * 10),
        e => format!("{mantissa}{}", "0".repeat(usize::from(e - 2))),
    }
}

/// Convert degrees/minutes/seconds into thousandths of an arc second.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn arc_offset(degrees: &str, minutes: &str, seconds: &str, limit: u8) -> Result<u32> {
    let d: u8 = degrees
        .parse()
        .map_err(|_| CoreError::Loc(format!("degrees '{degrees}' out of range")))?;
    if d > limit {
        return Err(CoreError::Loc(format!("{d} degrees exceeds {limit}")));
    }

    let m: u8 = if minutes.is_empty() {
        0
    } else {
        minutes
            .parse()
            .map_err(|_| CoreError::Loc(format!("minutes '{minutes}' out of range")))?
    };
    if m > 59 {
        return Err(CoreError::Loc(format!("{m} minutes exceeds 59")));
    }

    let s: f64 = if seconds.is_empty() {
        0.0
    } else {
        seconds
            .parse()
            .map_err(|_| CoreError::Loc(format!("seconds '{seconds}' is not a number")))?
    };
    if !(0.0..60.0).contains(&s) {
        return Err(CoreError::Loc(format!("{s} seconds must be below 60")));
    }

    let millis = ((f64::from(d) * 60.0 + f64::from(m)) * 60.0 + s) * 1000.0;
    let millis = millis.round();
    if millis > f64::from(u32::from(limit) * LOC_DEGREES) {
        return Err(CoreError::Loc(format!(
            "{degrees} {minutes} {seconds} exceeds {limit} degrees"
        )));
    }
    Ok(millis as u32)
}

/// Convert an altitude in metres into centimetres above the reference.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn altitude(metres: &str) -> Result<u32> {
    let value: f64 = metres
        .parse()
        .map_err(|_| CoreError::Loc(format!("altitude '{metres}' is not a number")))?;
    if !(-LOC_ALTITUDE_BASE..=LOC_ALTITUDE_MAX).contains(&value) {
        return Err(CoreError::Loc(format!(
            "altitude {value}m outside [-{LOC_ALTITUDE_BASE}, {LOC_ALTITUDE_MAX}]"
        )));
    }
    Ok(((value + LOC_ALTITUDE_BASE) * 100.0).round() as u32)
}

/// Pack a size or precision in metres into the mantissa/exponent byte.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn size_precision(metres: &str, default: u8) -> Result<u8> {
    if metres.is_empty() {
        return Ok(default);
    }
    let value: f64 = metres
        .parse()
        .map_err(|_| CoreError::Loc(format!("precision '{metres}' is not a number")))?;
    if !(0.0..=LOC_PRECISION_MAX).contains(&value) {
        return Err(CoreError::Loc(format!(
            "precision {value}m outside [0, {LOC_PRECISION_MAX}]"
        )));
    }

    let mut mantissa = (value * 100.0).round() as u64;
    let mut exponent = 0u8;
    while mantissa >= 10 {
        mantissa /= 10;
        exponent += 1;
    }
    Ok(((mantissa as u8) << 4) | exponent)
}

/// Check that a packed size/precision byte has digits in range.
pub fn check_precision(field: &str, packed: u8) -> Result<()> {
    if packed >> 4 > 9 || packed & 0x0f > 9 {
        return Err(CoreError::Validation(format!(
            "{field} byte {packed:#04x} has a mantissa or exponent above 9"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boston_example() {
        let loc: Loc = "42 21 54 N 71 06 18 W -24m 30m".parse().unwrap();
        assert_eq!(loc.latitude, LOC_EQUATOR + (42 * 3600 + 21 * 60 + 54) * 1000);
        assert_eq!(loc.latitude, 2_299_997_648);
        assert_eq!(loc.longitude, LOC_PRIMEMERIDIAN - (71 * 3600 + 6 * 60 + 18) * 1000);
        assert_eq!(loc.longitude, 1_891_505_648);
        assert_eq!(loc.altitude, 9_997_600);
        assert_eq!(loc.size, 0x33);
        assert_eq!(loc.horizontal_precision, DEFAULT_HORIZONTAL_PRECISION);
        assert_eq!(loc.vertical_precision, DEFAULT_VERTICAL_PRECISION);
        assert_eq!(loc.version, 0);
    }

    #[test]
    fn test_version_is_passed_through() {
        let loc = Loc::parse("52 14 05 N 00 08 50 E 10m", 3).unwrap();
        assert_eq!(loc.version, 3);
        assert_eq!(loc.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_degrees_only() {
        let loc: Loc = "59 N 10 E 15.0 30.0 2000.0 5.0".parse().unwrap();
        assert_eq!(loc.latitude, LOC_EQUATOR + 59 * LOC_DEGREES);
        assert_eq!(loc.longitude, LOC_PRIMEMERIDIAN + 10 * LOC_DEGREES);
        assert_eq!(loc.altitude, 10_001_500);
        assert_eq!(loc.size, 0x33);
        assert_eq!(loc.horizontal_precision, 0x25);
        assert_eq!(loc.vertical_precision, 0x52);
    }

    #[test]
    fn test_southern_eastern_hemispheres() {
        let loc: Loc = "2 7 19 S 116 2 25 E 10m".parse().unwrap();
        assert_eq!(loc.latitude, LOC_EQUATOR - (2 * 3600 + 7 * 60 + 19) * 1000);
        assert_eq!(loc.longitude, LOC_PRIMEMERIDIAN + (116 * 3600 + 2 * 60 + 25) * 1000);
    }

    #[test]
    fn test_fractional_seconds() {
        let loc: Loc = "42 21 43.952 N 71 5 6.344 W -24m 1m 200m".parse().unwrap();
        assert_eq!(loc.latitude, LOC_EQUATOR + 152_503_952);
        assert_eq!(loc.longitude, LOC_PRIMEMERIDIAN - 255_906_344);
        assert_eq!(loc.size, 0x12);
        assert_eq!(loc.horizontal_precision, 0x24);
        assert_eq!(loc.vertical_precision, DEFAULT_VERTICAL_PRECISION);
    }

    #[test]
    fn test_altitude_bounds() {
        let low: Loc = "0 N 0 E -100000m".parse().unwrap();
        assert_eq!(low.altitude, 0);
        let high: Loc = "0 N 0 E 42849672.95m".parse().unwrap();
        assert_eq!(high.altitude, u32::MAX);

        assert!("0 N 0 E -100000.01m".parse::<Loc>().is_err());
        assert!("0 N 0 E 42849672.96m".parse::<Loc>().is_err());
    }

    #[test]
    fn test_format_matches_presentation() {
        let loc: Loc = "42 21 54 N 71 06 18 W -24m 30m".parse().unwrap();
        assert_eq!(loc.to_string(), "42 21 54.000 N 71 06 18.000 W -24m 30m 10000m 10m");

        let loc: Loc = "2 7 19.5 S 116 2 25 E 10.25m 0.5m 0.05m".parse().unwrap();
        assert_eq!(loc.to_string(), "02 07 19.500 S 116 02 25.000 E 10.25m 0.50m 0.05m 10m");
    }

    #[test]
    fn test_round_trip_matrix() {
        let inputs = [
            "42 21 54 N 71 06 18 W -24m 30m",
            "42 21 43.952 N 71 5 6.344 W -24m 1m 200m",
            "52 14 05 N 00 08 50 E 10m",
            "2 7 19 S 116 2 25 E 10m",
            "42 21 28.764 N 71 00 51.617 W -44m 2000m",
            "59 N 10 E 15.0 30.0 2000.0 5.0",
            "90 S 180 W -100000m 0m 0m 0m",
            "90 N 180 E 42849672.95m 90000000m 90000000m 90000000m",
            "0 N 0 E 0m",
        ];
        for input in inputs {
            let parsed: Loc = input.parse().unwrap();
            let reparsed: Loc = parsed.to_string().parse().unwrap();
            assert_eq!(parsed, reparsed, "round trip of '{input}'");
        }
    }

    #[test]
    fn test_out_of_range_coordinates() {
        assert!("91 N 0 E 0m".parse::<Loc>().is_err());
        assert!("90 30 N 0 E 0m".parse::<Loc>().is_err());
        assert!("0 N 181 E 0m".parse::<Loc>().is_err());
        assert!("42 60 N 71 W 0m".parse::<Loc>().is_err());
        assert!("42 21 60 N 71 W 0m".parse::<Loc>().is_err());
        assert!("300 N 0 E 0m".parse::<Loc>().is_err());
    }

    #[test]
    fn test_malformed_input() {
        assert!("".parse::<Loc>().is_err());
        assert!("hello".parse::<Loc>().is_err());
        assert!("42 21 54 N 71 06 18 W".parse::<Loc>().is_err());
        assert!("42 21 54 n 71 06 18 w 0m".parse::<Loc>().is_err());
        assert!("42 21 54 N 71 06 18 W 0m 1m 1m 1m 1m".parse::<Loc>().is_err());
        assert!("0 N 0 E 0m 90000001m".parse::<Loc>().is_err());
    }

    #[test]
    fn test_precision_check() {
        assert!(check_precision("size", 0x99).is_ok());
        assert!(check_precision("size", 0xa2).is_err());
        assert!(check_precision("size", 0x1a).is_err());
    }
}
