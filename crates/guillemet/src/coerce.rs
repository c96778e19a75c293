// File: src/coerce.rs
// Purpose: Typed coercion of captured wildcard values

use num_complex::Complex64;

use crate::error::Error;
use crate::value::Value;

/// Coerces one captured wildcard value.
///
/// `spec` is the wildcard's inner text, `name` or `name.type`. With no
/// type suffix the raw string passes through verbatim. With a suffix,
/// the value is parsed per the fixed vocabulary below; parse failures
/// chain the underlying error, unknown type names are their own error.
///
/// Narrow widths parse at the declared width (so `{n.int8}` rejects
/// `"200"`) and then widen into the engine's value variants.
///
/// | suffix | target |
/// |---|---|
/// | `bool` | boolean |
/// | `int`, `int8`..`int64` | signed integer (platform word for `int`) |
/// | `uint`, `uint8`..`uint64`, `uintptr` | unsigned integer |
/// | `byte` | single byte |
/// | `rune` | single code point |
/// | `float32`, `float64` | floating point |
/// | `complex64`, `complex128` | complex number |
/// | `string` | explicit passthrough |
pub fn coerce(spec: &str, raw: &str) -> Result<(String, Value), Error> {
    let (name, ty) = match spec.split_once('.') {
        Some((name, ty)) => (name, ty),
        None => return Ok((spec.to_string(), Value::String(raw.to_string()))),
    };

    let invalid = |source: Box<dyn std::error::Error + Send + Sync>| Error::InvalidWildcardValue {
        value: raw.to_string(),
        ty: ty.to_string(),
        source,
    };

    let value = match ty {
        "bool" => raw
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|e| invalid(Box::new(e)))?,

        // Platform-word widths fit in 64 bits on every supported
        // target, so they widen with a plain cast.
        "int" => raw
            .parse::<isize>()
            .map(|v| Value::Int(v as i64))
            .map_err(|e| invalid(Box::new(e)))?,
        "int8" => parse_int::<i8>(raw).map_err(invalid)?,
        "int16" => parse_int::<i16>(raw).map_err(invalid)?,
        "int32" => parse_int::<i32>(raw).map_err(invalid)?,
        "int64" => parse_int::<i64>(raw).map_err(invalid)?,

        "uint" | "uintptr" => raw
            .parse::<usize>()
            .map(|v| Value::Uint(v as u64))
            .map_err(|e| invalid(Box::new(e)))?,
        "uint8" | "byte" => parse_uint::<u8>(raw).map_err(invalid)?,
        "uint16" => parse_uint::<u16>(raw).map_err(invalid)?,
        "uint32" => parse_uint::<u32>(raw).map_err(invalid)?,
        "uint64" => parse_uint::<u64>(raw).map_err(invalid)?,

        "float32" => raw
            .parse::<f32>()
            .map(|v| Value::Float(v as f64))
            .map_err(|e| invalid(Box::new(e)))?,
        "float64" => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| invalid(Box::new(e)))?,

        "complex64" | "complex128" => raw
            .parse::<Complex64>()
            .map(Value::Complex)
            .map_err(|e| invalid(Box::new(e)))?,

        "rune" => raw
            .parse::<char>()
            .map(Value::Char)
            .map_err(|e| invalid(Box::new(e)))?,

        "string" => Value::String(raw.to_string()),

        _ => {
            return Err(Error::UnknownWildcardType {
                spec: spec.to_string(),
                ty: ty.to_string(),
            })
        }
    };

    Ok((name.to_string(), value))
}

fn parse_int<T>(raw: &str) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>
where
    T: std::str::FromStr<Err = std::num::ParseIntError> + Into<i64>,
{
    match raw.parse::<T>() {
        Ok(v) => Ok(Value::Int(v.into())),
        Err(e) => Err(Box::new(e)),
    }
}

fn parse_uint<T>(raw: &str) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>
where
    T: std::str::FromStr<Err = std::num::ParseIntError> + Into<u64>,
{
    match raw.parse::<T>() {
        Ok(v) => Ok(Value::Uint(v.into())),
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("b.bool", "true", Value::Bool(true))]
    #[case("b.bool", "false", Value::Bool(false))]
    #[case("n.int", "-7", Value::Int(-7))]
    #[case("n.int8", "-128", Value::Int(-128))]
    #[case("n.int16", "-30000", Value::Int(-30000))]
    #[case("n.int32", "70000", Value::Int(70000))]
    #[case("n.int64", "-42", Value::Int(-42))]
    #[case("n.uint", "9", Value::Uint(9))]
    #[case("n.uint8", "255", Value::Uint(255))]
    #[case("n.byte", "58", Value::Uint(58))]
    #[case("n.uint16", "65535", Value::Uint(65535))]
    #[case("n.uint32", "70000", Value::Uint(70000))]
    #[case("n.uint64", "18446744073709551615", Value::Uint(u64::MAX))]
    #[case("n.uintptr", "4096", Value::Uint(4096))]
    #[case("f.float32", "2.5", Value::Float(2.5))]
    #[case("f.float64", "-0.125", Value::Float(-0.125))]
    #[case("r.rune", "x", Value::Char('x'))]
    #[case("s.string", "verbatim", Value::String("verbatim".into()))]
    fn coerces_supported_types(#[case] spec: &str, #[case] raw: &str, #[case] expected: Value) {
        let (name, value) = coerce(spec, raw).unwrap();
        assert_eq!(name, spec.split('.').next().unwrap());
        assert_eq!(value, expected);
    }

    #[test]
    fn untyped_wildcard_passes_through() {
        let (name, value) = coerce("slug", "hello-world").unwrap();
        assert_eq!(name, "slug");
        assert_eq!(value, Value::String("hello-world".into()));
    }

    #[test]
    fn complex_values() {
        let (_, value) = coerce("z.complex128", "3+4i").unwrap();
        assert_eq!(value, Value::Complex(Complex64::new(3.0, 4.0)));

        let (_, value) = coerce("z.complex64", "-1i").unwrap();
        assert_eq!(value, Value::Complex(Complex64::new(0.0, -1.0)));
    }

    #[rstest]
    #[case("b.bool", "yes")]
    #[case("n.int8", "200")]
    #[case("n.uint8", "-1")]
    #[case("n.int64", "forty-two")]
    #[case("f.float64", "1.2.3")]
    #[case("r.rune", "ab")]
    #[case("z.complex128", "not-a-number")]
    fn invalid_values_chain_the_parse_error(#[case] spec: &str, #[case] raw: &str) {
        let err = coerce(spec, raw).unwrap_err();
        match &err {
            Error::InvalidWildcardValue { value, .. } => {
                assert_eq!(value, raw);
                assert!(std::error::Error::source(&err).is_some());
            }
            other => panic!("expected InvalidWildcardValue, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_distinct() {
        let err = coerce("x.decimal", "1").unwrap_err();
        match err {
            Error::UnknownWildcardType { spec, ty } => {
                assert_eq!(spec, "x.decimal");
                assert_eq!(ty, "decimal");
            }
            other => panic!("expected UnknownWildcardType, got {other:?}"),
        }
    }

    #[test]
    fn display_round_trip_matches_raw() {
        for (spec, raw) in [
            ("n.int64", "-42"),
            ("n.byte", "58"),
            ("b.bool", "true"),
            ("f.float64", "2.5"),
            ("r.rune", "x"),
        ] {
            let (_, value) = coerce(spec, raw).unwrap();
            assert_eq!(value.to_string(), raw);
        }
    }
}
