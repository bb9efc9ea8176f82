use proptest::prelude::*;
use rstest::rstest;
use scale_hardware::protocol::{DecodeError, WireFormat, decode_line};
use scale_traits::Reading;

#[rstest]
#[case("S  12.34  kg", Reading::stable(12.34))]
#[case("U   0.50  kg", Reading::unstable(0.50))]
#[case("M 100 kg\r\n", Reading::unstable(100.0))]
#[case("S 0.005 kg\n", Reading::stable(0.005))]
fn well_formed_simple_lines(#[case] line: &str, #[case] expected: Reading) {
    assert_eq!(decode_line(line, &WireFormat::SIMPLE), Ok(expected));
}

#[rstest]
#[case("", DecodeError::Empty)]
#[case("   \r\n", DecodeError::Empty)]
#[case("S", DecodeError::MissingMagnitude { index: 0 })]
#[case("S    ", DecodeError::MissingMagnitude { index: 0 })]
#[case("S  abc  kg", DecodeError::InvalidMagnitude { token: "abc".into() })]
#[case("S  12,34  kg", DecodeError::InvalidMagnitude { token: "12,34".into() })]
#[case("S  1.2.3  kg", DecodeError::InvalidMagnitude { token: "1.2.3".into() })]
#[case("S  -1.50  kg", DecodeError::NegativeMagnitude { token: "-1.50".into() })]
#[case("S  inf  kg", DecodeError::InvalidMagnitude { token: "inf".into() })]
#[case("S  NaN  kg", DecodeError::InvalidMagnitude { token: "NaN".into() })]
#[case("S  1e999  kg", DecodeError::NonFiniteMagnitude { token: "1e999".into() })]
fn malformed_simple_lines(#[case] line: &str, #[case] expected: DecodeError) {
    assert_eq!(decode_line(line, &WireFormat::SIMPLE), Err(expected));
}

#[rstest]
#[case("ASNG/W+  0.00  kg", Ok(Reading::stable(0.0)))]
#[case("ASNG/W+ 12.50  kg\r\n", Ok(Reading::stable(12.5)))]
#[case("AUNG/W+  1.25  kg", Ok(Reading::unstable(1.25)))]
#[case("ASN", Err(DecodeError::TooShort { len: 3, min: 4 }))]
#[case("ASNG/W+", Err(DecodeError::MissingMagnitude { index: 1 }))]
#[case("ASNG/W+  --  kg", Err(DecodeError::InvalidMagnitude { token: "--".into() }))]
fn device_status_block_lines(#[case] line: &str, #[case] expected: Result<Reading, DecodeError>) {
    assert_eq!(decode_line(line, &WireFormat::STATUS_BLOCK), expected);
}

fn format_strategy() -> impl Strategy<Value = WireFormat> {
    prop_oneof![Just(WireFormat::SIMPLE), Just(WireFormat::STATUS_BLOCK)]
}

proptest! {
    // Render a line for the given layout and check the decoder recovers exactly
    // what was written.
    #[test]
    fn decode_recovers_rendered_values(
        format in format_strategy(),
        cents in 0u32..10_000_000,
        stable in any::<bool>(),
        pad in 1usize..4,
    ) {
        let magnitude = format!("{}.{:02}", cents / 100, cents % 100);
        let marker = if stable { 'S' } else { 'U' };
        let line = if format == WireFormat::SIMPLE {
            format!("{marker}{}{magnitude}  kg\r\n", " ".repeat(pad))
        } else {
            format!("A{marker}NG/W+{}{magnitude}  kg\r\n", " ".repeat(pad))
        };
        let expected: f64 = magnitude.parse().unwrap();
        let r = decode_line(&line, &format).unwrap();
        prop_assert_eq!(r.weight, expected);
        prop_assert_eq!(r.stable, stable);
        // pure: same input, same output
        prop_assert_eq!(decode_line(&line, &format), Ok(r));
    }

    #[test]
    fn arbitrary_input_never_panics(line in ".{0,40}", format in format_strategy()) {
        if let Ok(r) = decode_line(&line, &format) {
            prop_assert!(r.weight.is_finite());
            prop_assert!(r.weight >= 0.0);
        }
    }
}
