//! Phone number cleansing applied before validation.

use phonenumber::country;

/// Turns a user-supplied phone number into its bare digit form.
///
/// Implementations must not fail: garbage in yields (possibly empty) digits out,
/// and validation happens afterwards on [`PhoneNumber`](crate::PhoneNumber).
pub trait Sanitizer {
    fn sanitize(&self, raw: &str) -> String;
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> String,
{
    fn sanitize(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Default sanitizer: keeps decimal digits, drops everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitSanitizer;

impl Sanitizer for DigitSanitizer {
    fn sanitize(&self, raw: &str) -> String {
        raw.chars().filter(char::is_ascii_digit).collect()
    }
}

/// Region-aware sanitizer backed by `phonenumber`.
///
/// Numbers that parse for `region` come out as country code + national
/// number, so a Russian trunk-prefixed `8 (904) 534-23-14` becomes
/// `79045342314`. Anything that does not parse is digit-stripped instead.
#[derive(Debug, Clone, Copy)]
pub struct RegionSanitizer {
    region: country::Id,
}

impl RegionSanitizer {
    pub fn new(region: country::Id) -> Self {
        Self { region }
    }
}

impl Sanitizer for RegionSanitizer {
    fn sanitize(&self, raw: &str) -> String {
        match phonenumber::parse(Some(self.region), raw) {
            Ok(parsed) => phonenumber::format(&parsed)
                .mode(phonenumber::Mode::E164)
                .to_string()
                .trim_start_matches('+')
                .to_owned(),
            Err(_) => DigitSanitizer.sanitize(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_sanitizer_strips_everything_but_digits() {
        assert_eq!(DigitSanitizer.sanitize("+7 (904) 534-23-14"), "79045342314");
        assert_eq!(DigitSanitizer.sanitize("9045344321"), "9045344321");
    }

    #[test]
    fn digit_sanitizer_preserves_digit_order_and_count() {
        let inputs = ["a1b2c3", "--0--0--7", "١٢٣ 42", "tel:+1-800-555-0199 ext"];
        for input in inputs {
            let out = DigitSanitizer.sanitize(input);
            assert!(out.chars().all(|c| c.is_ascii_digit()), "{out}");
            let expected: String = input.chars().filter(char::is_ascii_digit).collect();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn digit_sanitizer_handles_empty_and_digitless_input() {
        assert_eq!(DigitSanitizer.sanitize(""), "");
        assert_eq!(DigitSanitizer.sanitize("call me"), "");
    }

    #[test]
    fn closures_are_sanitizers() {
        let keep_last_ten = |raw: &str| {
            let digits = DigitSanitizer.sanitize(raw);
            digits[digits.len().saturating_sub(10)..].to_owned()
        };
        assert_eq!(keep_last_ten.sanitize("+7 904 534 23 14"), "9045342314");
    }

    #[test]
    fn region_sanitizer_rewrites_trunk_prefix() {
        let sanitizer = RegionSanitizer::new(country::Id::RU);
        assert_eq!(sanitizer.sanitize("8 (904) 534-23-14"), "79045342314");
        assert_eq!(sanitizer.sanitize("+7 904 534 23 14"), "79045342314");
    }

    #[test]
    fn region_sanitizer_falls_back_to_digit_stripping() {
        let sanitizer = RegionSanitizer::new(country::Id::RU);
        assert_eq!(sanitizer.sanitize("not a number"), "");
    }
}
