//! Property-based tests for coercion and query binding.

use parambind::{BindRequest, Bindable, NumErrorKind, ParamValue, Parser};
use proptest::prelude::*;

#[derive(Bindable, Debug, Default)]
struct Widths {
    #[param = "query=small"]
    pub small: i8,
    #[param = "query=medium"]
    pub medium: i32,
    #[param = "query=port"]
    pub port: u16,
    #[param = "query=values"]
    pub values: Vec<i64>,
    #[param = "query=s"]
    pub s: String,
}

fn query(pairs: &[(&str, String)]) -> BindRequest {
    let encoded = serde_urlencoded::to_string(pairs).unwrap();
    BindRequest::builder().uri(format!("/p?{encoded}")).build()
}

/// Percent-encodes every byte a URI query cannot carry as-is.
fn escape_query(raw: &str) -> String {
    const KEPT: &[u8] = b"-._~!$&'()*+,;=:@/?%";
    raw.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || KEPT.contains(&b) {
                char::from(b).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}

// =============================================================================
// Integer widths
// =============================================================================

mod integer_widths {
    use super::*;

    fn parse_kind<T: ParamValue + Default>(text: &str) -> Option<NumErrorKind> {
        T::default()
            .assign_one(text)
            .err()
            .and_then(|e| e.num_error_kind())
    }

    proptest! {
        /// Every value inside the width binds unchanged.
        #[test]
        fn test_in_range_binds(a in any::<i8>(), b in any::<i32>(), c in any::<u16>()) {
            let request = query(&[
                ("small", a.to_string()),
                ("medium", b.to_string()),
                ("port", c.to_string()),
            ]);
            let bound: Widths = Parser::new().bind(&request).unwrap();

            prop_assert_eq!(bound.small, a);
            prop_assert_eq!(bound.medium, b);
            prop_assert_eq!(bound.port, c);
        }

        /// Values just past the width are range errors, not syntax errors.
        #[test]
        fn test_overflow_is_range(excess in 1_i64..1_000_000) {
            let above = i64::from(i32::MAX) + excess;
            let below = i64::from(i32::MIN) - excess;

            prop_assert_eq!(parse_kind::<i32>(&above.to_string()), Some(NumErrorKind::Range));
            prop_assert_eq!(parse_kind::<i32>(&below.to_string()), Some(NumErrorKind::Range));
        }

        /// Unsigned fields report overflow as a range error too.
        #[test]
        fn test_unsigned_overflow_is_range(excess in 1_u64..1_000_000) {
            let above = u64::from(u16::MAX) + excess;

            prop_assert_eq!(parse_kind::<u16>(&above.to_string()), Some(NumErrorKind::Range));
            prop_assert_eq!(
                parse_kind::<u64>(&(u128::from(u64::MAX) + u128::from(excess)).to_string()),
                Some(NumErrorKind::Range)
            );
        }

        /// A leading plus sign is rejected for unsigned fields only.
        #[test]
        fn test_plus_sign_is_unsigned_syntax(n in any::<u16>()) {
            prop_assert_eq!(parse_kind::<u16>(&format!("+{n}")), Some(NumErrorKind::Syntax));
            prop_assert_eq!(parse_kind::<i32>(&format!("+{n}")), None);
        }

        /// Negative input never fits an unsigned field.
        #[test]
        fn test_negative_unsigned_is_syntax(n in 1_u32..100_000) {
            prop_assert_eq!(parse_kind::<u16>(&format!("-{n}")), Some(NumErrorKind::Syntax));
        }

        /// Non-numeric text is a syntax error.
        #[test]
        fn test_letters_are_syntax(text in "[a-zA-Z]{1,12}") {
            prop_assert_eq!(parse_kind::<i8>(&text), Some(NumErrorKind::Syntax));
        }
    }
}

// =============================================================================
// Query values
// =============================================================================

mod query_values {
    use super::*;

    proptest! {
        /// A slice field keeps every value in request order.
        #[test]
        fn test_slice_preserves_order(values in prop::collection::vec(any::<i64>(), 1..16)) {
            let pairs: Vec<_> = values.iter().map(|v| ("values", v.to_string())).collect();
            let bound: Widths = Parser::new().bind(&query(&pairs)).unwrap();

            prop_assert_eq!(bound.values, values);
        }

        /// Strings survive URL encoding unchanged.
        #[test]
        fn test_string_round_trips(s in "[a-zA-Z0-9 &=?/+%#éü]{1,40}") {
            let bound: Widths = Parser::new().bind(&query(&[("s", s.clone())])).unwrap();

            prop_assert_eq!(bound.s, s);
        }

        /// Binding never panics on arbitrary query strings.
        #[test]
        fn test_arbitrary_query_never_panics(raw in "[ -~]{1,64}") {
            let encoded = escape_query(&raw);
            let request = BindRequest::builder().uri(format!("/p?{encoded}")).build();

            prop_assert_eq!(request.query_string(), Some(encoded.as_str()));
            let _ = Parser::new().bind::<Widths>(&request);
        }
    }
}
