// meteoblue_relay - HTTP relay for daily temperatures from the Meteoblue API
//
// Copyright 2024 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::forecast::Location;
use std::fmt;

/// Raw query string parameters of a temperature request, exactly as sent by the caller.
#[derive(Debug, Default)]
pub struct TemperatureParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub days: Option<String>,
}

impl TemperatureParams {
    /// Collect parameters from decoded query string pairs. When a key is repeated only
    /// its first value is used and unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = TemperatureParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "latitude" => &mut params.latitude,
                "longitude" => &mut params.longitude,
                "days" => &mut params.days,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value);
            }
        }

        params
    }

    /// Convert to a `TemperatureQuery` if both coordinates are present and non-empty.
    pub fn validate(self) -> Option<TemperatureQuery> {
        let latitude = self.latitude.filter(|s| !s.is_empty())?;
        let longitude = self.longitude.filter(|s| !s.is_empty())?;
        let days = DayCount::parse(self.days.as_deref());

        Some(TemperatureQuery {
            latitude,
            longitude,
            days,
        })
    }
}

/// Validated temperature request.
///
/// Coordinates are kept as the caller sent them since they are forwarded to Meteoblue
/// verbatim and echoed back in the response message.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureQuery {
    pub latitude: String,
    pub longitude: String,
    pub days: DayCount,
}

impl TemperatureQuery {
    /// Numeric location of the request, `None` for a coordinate without a numeric prefix.
    pub fn location(&self) -> Location {
        Location {
            latitude: parse_float_prefix(&self.latitude),
            longitude: parse_float_prefix(&self.longitude),
        }
    }
}

/// Number of days requested by the caller.
///
/// A value that doesn't start with an integer is kept as "not a number" instead of
/// being rejected: it selects no days and renders as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount(Option<i64>);

impl DayCount {
    pub const DEFAULT: DayCount = DayCount(Some(1));

    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Self::DEFAULT,
            Some(s) => DayCount(parse_int_prefix(s)),
        }
    }

    /// Number of days to emit when `available` days are present upstream.
    pub fn limit(&self, available: usize) -> usize {
        match self.0 {
            Some(n) if n > 0 => usize::try_from(n).map_or(available, |n| n.min(available)),
            _ => 0,
        }
    }
}

impl Default for DayCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{}", n),
            None => f.write_str("NaN"),
        }
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Parse the leading integer of `s`, ignoring anything after it ("2.7" is 2, "3d" is 3).
///
/// A `0x` or `0X` prefix selects hexadecimal ("0x1A" is 26).
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, rest) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let digits: Vec<u32> = rest.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.iter().fold(0i64, |acc, d| {
        acc.saturating_mul(i64::from(radix)).saturating_add(i64::from(*d))
    });

    Some(if negative { -magnitude } else { magnitude })
}

/// Parse the leading decimal number of `s`, ignoring anything after it ("12.5abc" is 12.5).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }

        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(latitude: Option<&str>, longitude: Option<&str>, days: Option<&str>) -> TemperatureParams {
        TemperatureParams {
            latitude: latitude.map(String::from),
            longitude: longitude.map(String::from),
            days: days.map(String::from),
        }
    }

    #[test]
    fn validate_requires_both_coordinates() {
        assert!(params(None, Some("-46.63"), None).validate().is_none());
        assert!(params(Some("-23.55"), None, None).validate().is_none());
        assert!(params(Some(""), Some("-46.63"), None).validate().is_none());
        assert!(params(Some("-23.55"), Some(""), Some("2")).validate().is_none());
    }

    #[test]
    fn validate_keeps_raw_coordinates() {
        let query = params(Some(" -23.55"), Some("-46.63x"), Some("2")).validate().unwrap();

        assert_eq!(" -23.55", query.latitude);
        assert_eq!("-46.63x", query.longitude);
        assert_eq!(DayCount::parse(Some("2")), query.days);
    }

    #[test]
    fn days_default_to_one() {
        let query = params(Some("1"), Some("2"), None).validate().unwrap();
        assert_eq!(DayCount::DEFAULT, query.days);
        assert_eq!("1", query.days.to_string());

        let query = params(Some("1"), Some("2"), Some("")).validate().unwrap();
        assert_eq!(DayCount::DEFAULT, query.days);
    }

    #[test]
    fn days_use_integer_prefix() {
        assert_eq!("3", DayCount::parse(Some("3")).to_string());
        assert_eq!("2", DayCount::parse(Some("2.7")).to_string());
        assert_eq!("5", DayCount::parse(Some("  5 days")).to_string());
        assert_eq!("-1", DayCount::parse(Some("-1")).to_string());
        assert_eq!("NaN", DayCount::parse(Some("abc")).to_string());
        assert_eq!("NaN", DayCount::parse(Some("-")).to_string());
    }

    #[test]
    fn days_accept_hex_prefix() {
        assert_eq!("2", DayCount::parse(Some("0x2")).to_string());
        assert_eq!("26", DayCount::parse(Some("0X1a")).to_string());
        assert_eq!("-16", DayCount::parse(Some("-0x10")).to_string());
        assert_eq!("NaN", DayCount::parse(Some("0x")).to_string());
        assert_eq!("NaN", DayCount::parse(Some("0xg")).to_string());
        assert_eq!("0", DayCount::parse(Some("0y5")).to_string());
    }

    #[test]
    fn from_pairs_keeps_first_value() {
        let pairs = vec![
            ("latitude".to_owned(), "1".to_owned()),
            ("latitude".to_owned(), "2".to_owned()),
            ("unit".to_owned(), "imperial".to_owned()),
            ("longitude".to_owned(), "3".to_owned()),
            ("days".to_owned(), "4".to_owned()),
            ("days".to_owned(), "5".to_owned()),
        ];
        let query = TemperatureParams::from_pairs(pairs).validate().unwrap();

        assert_eq!("1", query.latitude);
        assert_eq!("3", query.longitude);
        assert_eq!("4", query.days.to_string());
    }

    #[test]
    fn from_pairs_without_coordinates() {
        let params = TemperatureParams::from_pairs(vec![("days".to_owned(), "2".to_owned())]);
        assert!(params.validate().is_none());
    }

    #[test]
    fn days_limit_to_available() {
        assert_eq!(2, DayCount::parse(Some("2")).limit(7));
        assert_eq!(7, DayCount::parse(Some("14")).limit(7));
        assert_eq!(1, DayCount::DEFAULT.limit(7));
        assert_eq!(0, DayCount::DEFAULT.limit(0));
        assert_eq!(0, DayCount::parse(Some("0")).limit(7));
        assert_eq!(0, DayCount::parse(Some("-3")).limit(7));
        assert_eq!(0, DayCount::parse(Some("many")).limit(7));
    }

    #[test]
    fn location_uses_float_prefix() {
        let query = params(Some("-23.55"), Some("46.63abc"), None).validate().unwrap();
        let location = query.location();
        assert_eq!(Some(-23.55), location.latitude);
        assert_eq!(Some(46.63), location.longitude);
    }

    #[test]
    fn float_prefix_forms() {
        assert_eq!(Some(12.0), parse_float_prefix("12"));
        assert_eq!(Some(0.5), parse_float_prefix(".5"));
        assert_eq!(Some(-0.5), parse_float_prefix("-.5"));
        assert_eq!(Some(3.0), parse_float_prefix("3."));
        assert_eq!(Some(1500.0), parse_float_prefix("1.5e3"));
        assert_eq!(Some(1.5), parse_float_prefix("1.5e"));
        assert_eq!(Some(7.0), parse_float_prefix("  +7,2"));
        assert_eq!(None, parse_float_prefix("north"));
        assert_eq!(None, parse_float_prefix("."));
        assert_eq!(None, parse_float_prefix(""));
    }
}
