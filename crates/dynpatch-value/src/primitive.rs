//! Leaf values of the dynamic value tree.

use std::fmt;

use chrono::{DateTime, FixedOffset, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc, Weekday};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::temporal::{
    same_offset_date_time, serde_time_delta, write_offset, MonthDay, OffsetTime, Period, YearMonth,
    ZonedDateTime,
};

// ── PrimitiveValue ────────────────────────────────────────────────────────

/// A leaf value. The set of kinds is closed; [`PrimitiveValue::type_index`]
/// gives each kind a stable ordinal for serialized discriminators.
///
/// Equality is representational rather than numeric: floats compare by bit
/// pattern, decimals by mantissa and scale, offset date-times by instant and
/// offset. Two values are equal only if they would serialize identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PrimitiveValue {
    Unit,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    BigInt(BigInt),
    BigDecimal(Decimal),
    DayOfWeek(Weekday),
    Duration(#[serde(with = "serde_time_delta")] TimeDelta),
    Instant(DateTime<Utc>),
    LocalDate(NaiveDate),
    LocalDateTime(NaiveDateTime),
    LocalTime(NaiveTime),
    Month(Month),
    MonthDay(MonthDay),
    OffsetDateTime(DateTime<FixedOffset>),
    OffsetTime(OffsetTime),
    Period(Period),
    Year(i32),
    YearMonth(YearMonth),
    ZoneId(String),
    /// Seconds east of UTC.
    ZoneOffset(i32),
    ZonedDateTime(ZonedDateTime),
    /// ISO 4217 currency code.
    Currency(String),
    Uuid(Uuid),
}

impl PrimitiveValue {
    /// Stable ordinal of this kind, `0..=29`.
    pub fn type_index(&self) -> u8 {
        match self {
            PrimitiveValue::Unit => 0,
            PrimitiveValue::Boolean(_) => 1,
            PrimitiveValue::Byte(_) => 2,
            PrimitiveValue::Short(_) => 3,
            PrimitiveValue::Int(_) => 4,
            PrimitiveValue::Long(_) => 5,
            PrimitiveValue::Float(_) => 6,
            PrimitiveValue::Double(_) => 7,
            PrimitiveValue::Char(_) => 8,
            PrimitiveValue::String(_) => 9,
            PrimitiveValue::BigInt(_) => 10,
            PrimitiveValue::BigDecimal(_) => 11,
            PrimitiveValue::DayOfWeek(_) => 12,
            PrimitiveValue::Duration(_) => 13,
            PrimitiveValue::Instant(_) => 14,
            PrimitiveValue::LocalDate(_) => 15,
            PrimitiveValue::LocalDateTime(_) => 16,
            PrimitiveValue::LocalTime(_) => 17,
            PrimitiveValue::Month(_) => 18,
            PrimitiveValue::MonthDay(_) => 19,
            PrimitiveValue::OffsetDateTime(_) => 20,
            PrimitiveValue::OffsetTime(_) => 21,
            PrimitiveValue::Period(_) => 22,
            PrimitiveValue::Year(_) => 23,
            PrimitiveValue::YearMonth(_) => 24,
            PrimitiveValue::ZoneId(_) => 25,
            PrimitiveValue::ZoneOffset(_) => 26,
            PrimitiveValue::ZonedDateTime(_) => 27,
            PrimitiveValue::Currency(_) => 28,
            PrimitiveValue::Uuid(_) => 29,
        }
    }

    /// Lower-case kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveValue::Unit => "unit",
            PrimitiveValue::Boolean(_) => "boolean",
            PrimitiveValue::Byte(_) => "byte",
            PrimitiveValue::Short(_) => "short",
            PrimitiveValue::Int(_) => "int",
            PrimitiveValue::Long(_) => "long",
            PrimitiveValue::Float(_) => "float",
            PrimitiveValue::Double(_) => "double",
            PrimitiveValue::Char(_) => "char",
            PrimitiveValue::String(_) => "string",
            PrimitiveValue::BigInt(_) => "big_int",
            PrimitiveValue::BigDecimal(_) => "big_decimal",
            PrimitiveValue::DayOfWeek(_) => "day_of_week",
            PrimitiveValue::Duration(_) => "duration",
            PrimitiveValue::Instant(_) => "instant",
            PrimitiveValue::LocalDate(_) => "local_date",
            PrimitiveValue::LocalDateTime(_) => "local_date_time",
            PrimitiveValue::LocalTime(_) => "local_time",
            PrimitiveValue::Month(_) => "month",
            PrimitiveValue::MonthDay(_) => "month_day",
            PrimitiveValue::OffsetDateTime(_) => "offset_date_time",
            PrimitiveValue::OffsetTime(_) => "offset_time",
            PrimitiveValue::Period(_) => "period",
            PrimitiveValue::Year(_) => "year",
            PrimitiveValue::YearMonth(_) => "year_month",
            PrimitiveValue::ZoneId(_) => "zone_id",
            PrimitiveValue::ZoneOffset(_) => "zone_offset",
            PrimitiveValue::ZonedDateTime(_) => "zoned_date_time",
            PrimitiveValue::Currency(_) => "currency",
            PrimitiveValue::Uuid(_) => "uuid",
        }
    }

    /// Returns true if both values are of the same kind.
    pub fn same_kind(&self, other: &PrimitiveValue) -> bool {
        self.type_index() == other.type_index()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrimitiveValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for PrimitiveValue {
    fn eq(&self, other: &Self) -> bool {
        use PrimitiveValue as P;
        match (self, other) {
            (P::Unit, P::Unit) => true,
            (P::Boolean(a), P::Boolean(b)) => a == b,
            (P::Byte(a), P::Byte(b)) => a == b,
            (P::Short(a), P::Short(b)) => a == b,
            (P::Int(a), P::Int(b)) => a == b,
            (P::Long(a), P::Long(b)) => a == b,
            (P::Float(a), P::Float(b)) => a.to_bits() == b.to_bits(),
            (P::Double(a), P::Double(b)) => a.to_bits() == b.to_bits(),
            (P::Char(a), P::Char(b)) => a == b,
            (P::String(a), P::String(b)) => a == b,
            (P::BigInt(a), P::BigInt(b)) => a == b,
            (P::BigDecimal(a), P::BigDecimal(b)) => {
                a.mantissa() == b.mantissa()
                    && a.scale() == b.scale()
                    && a.is_sign_negative() == b.is_sign_negative()
            }
            (P::DayOfWeek(a), P::DayOfWeek(b)) => a == b,
            (P::Duration(a), P::Duration(b)) => a == b,
            (P::Instant(a), P::Instant(b)) => a == b,
            (P::LocalDate(a), P::LocalDate(b)) => a == b,
            (P::LocalDateTime(a), P::LocalDateTime(b)) => a == b,
            (P::LocalTime(a), P::LocalTime(b)) => a == b,
            (P::Month(a), P::Month(b)) => a == b,
            (P::MonthDay(a), P::MonthDay(b)) => a == b,
            (P::OffsetDateTime(a), P::OffsetDateTime(b)) => same_offset_date_time(a, b),
            (P::OffsetTime(a), P::OffsetTime(b)) => a == b,
            (P::Period(a), P::Period(b)) => a == b,
            (P::Year(a), P::Year(b)) => a == b,
            (P::YearMonth(a), P::YearMonth(b)) => a == b,
            (P::ZoneId(a), P::ZoneId(b)) => a == b,
            (P::ZoneOffset(a), P::ZoneOffset(b)) => a == b,
            (P::ZonedDateTime(a), P::ZonedDateTime(b)) => a == b,
            (P::Currency(a), P::Currency(b)) => a == b,
            (P::Uuid(a), P::Uuid(b)) => a == b,
            _ => false,
        }
    }
}

// Bitwise float comparison is reflexive, so the relation is a true equivalence.
impl Eq for PrimitiveValue {}

// ── Display ───────────────────────────────────────────────────────────────

/// Literal rendering: strings and chars are quoted and escaped, so the
/// output is safe to embed inside path syntax.
impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Unit => f.write_str("()"),
            PrimitiveValue::Boolean(b) => write!(f, "{b}"),
            PrimitiveValue::Byte(n) => write!(f, "{n}"),
            PrimitiveValue::Short(n) => write!(f, "{n}"),
            PrimitiveValue::Int(n) => write!(f, "{n}"),
            PrimitiveValue::Long(n) => write!(f, "{n}L"),
            PrimitiveValue::Float(n) => write!(f, "{n:?}f"),
            PrimitiveValue::Double(n) => write!(f, "{n:?}"),
            PrimitiveValue::Char(c) => write!(f, "'{}'", c.escape_default()),
            PrimitiveValue::String(s) => write!(f, "\"{}\"", s.escape_default()),
            PrimitiveValue::BigInt(n) => write!(f, "{n}"),
            PrimitiveValue::BigDecimal(d) => write!(f, "{d}"),
            PrimitiveValue::DayOfWeek(d) => write!(f, "{d}"),
            PrimitiveValue::Duration(d) => write!(f, "{d}"),
            PrimitiveValue::Instant(t) => f.write_str(&t.to_rfc3339()),
            PrimitiveValue::LocalDate(d) => write!(f, "{d}"),
            PrimitiveValue::LocalDateTime(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.f")),
            PrimitiveValue::LocalTime(t) => write!(f, "{t}"),
            PrimitiveValue::Month(m) => f.write_str(m.name()),
            PrimitiveValue::MonthDay(md) => write!(f, "{md}"),
            PrimitiveValue::OffsetDateTime(t) => f.write_str(&t.to_rfc3339()),
            PrimitiveValue::OffsetTime(t) => write!(f, "{t}"),
            PrimitiveValue::Period(p) => write!(f, "{p}"),
            PrimitiveValue::Year(y) => write!(f, "{y}"),
            PrimitiveValue::YearMonth(ym) => write!(f, "{ym}"),
            PrimitiveValue::ZoneId(z) => f.write_str(z),
            PrimitiveValue::ZoneOffset(s) => write_offset(f, *s),
            PrimitiveValue::ZonedDateTime(z) => write!(f, "{z}"),
            PrimitiveValue::Currency(c) => f.write_str(c),
            PrimitiveValue::Uuid(u) => write!(f, "{u}"),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PrimitiveValue {
                fn from(v: $ty) -> Self {
                    PrimitiveValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => String,
    BigInt => BigInt,
    Decimal => BigDecimal,
    Weekday => DayOfWeek,
    TimeDelta => Duration,
    DateTime<Utc> => Instant,
    NaiveDate => LocalDate,
    NaiveDateTime => LocalDateTime,
    NaiveTime => LocalTime,
    Month => Month,
    MonthDay => MonthDay,
    DateTime<FixedOffset> => OffsetDateTime,
    OffsetTime => OffsetTime,
    Period => Period,
    YearMonth => YearMonth,
    ZonedDateTime => ZonedDateTime,
    Uuid => Uuid,
}

impl From<&str> for PrimitiveValue {
    fn from(v: &str) -> Self {
        PrimitiveValue::String(v.to_owned())
    }
}

impl From<()> for PrimitiveValue {
    fn from(_: ()) -> Self {
        PrimitiveValue::Unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_indices_are_dense_and_stable() {
        let samples = vec![
            PrimitiveValue::Unit,
            PrimitiveValue::Boolean(true),
            PrimitiveValue::Byte(1),
            PrimitiveValue::Short(1),
            PrimitiveValue::Int(1),
            PrimitiveValue::Long(1),
            PrimitiveValue::Float(1.0),
            PrimitiveValue::Double(1.0),
            PrimitiveValue::Char('x'),
            PrimitiveValue::String("x".into()),
            PrimitiveValue::BigInt(BigInt::from(1)),
            PrimitiveValue::BigDecimal(Decimal::new(15, 1)),
            PrimitiveValue::DayOfWeek(Weekday::Mon),
            PrimitiveValue::Duration(TimeDelta::seconds(1)),
            PrimitiveValue::Instant(DateTime::<Utc>::from_timestamp(0, 0).unwrap()),
            PrimitiveValue::LocalDate(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            PrimitiveValue::LocalDateTime(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            ),
            PrimitiveValue::LocalTime(NaiveTime::from_hms_opt(1, 2, 3).unwrap()),
            PrimitiveValue::Month(Month::March),
            PrimitiveValue::MonthDay(MonthDay { month: 3, day: 1 }),
            PrimitiveValue::OffsetDateTime(
                DateTime::parse_from_rfc3339("2024-01-01T00:00:00+02:00").unwrap(),
            ),
            PrimitiveValue::OffsetTime(OffsetTime {
                time: NaiveTime::from_hms_opt(1, 2, 3).unwrap(),
                offset_seconds: 0,
            }),
            PrimitiveValue::Period(Period::new(0, 1, 0)),
            PrimitiveValue::Year(2024),
            PrimitiveValue::YearMonth(YearMonth { year: 2024, month: 2 }),
            PrimitiveValue::ZoneId("UTC".into()),
            PrimitiveValue::ZoneOffset(3600),
            PrimitiveValue::ZonedDateTime(ZonedDateTime {
                date_time: DateTime::parse_from_rfc3339("2024-01-01T00:00:00+01:00").unwrap(),
                zone: "Europe/Paris".into(),
            }),
            PrimitiveValue::Currency("EUR".into()),
            PrimitiveValue::Uuid(Uuid::nil()),
        ];
        for (i, v) in samples.iter().enumerate() {
            assert_eq!(v.type_index() as usize, i, "{}", v.type_name());
        }
    }

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(PrimitiveValue::Double(f64::NAN), PrimitiveValue::Double(f64::NAN));
        assert_ne!(PrimitiveValue::Double(0.0), PrimitiveValue::Double(-0.0));
        assert_ne!(PrimitiveValue::Int(1), PrimitiveValue::Long(1));
    }

    #[test]
    fn decimal_equality_includes_scale() {
        let a = PrimitiveValue::BigDecimal(Decimal::new(10, 1));
        let b = PrimitiveValue::BigDecimal(Decimal::new(100, 2));
        assert_ne!(a, b);
        assert_eq!(a, PrimitiveValue::BigDecimal(Decimal::new(10, 1)));
    }

    #[test]
    fn decimal_equality_includes_sign_of_zero() {
        let mut negative_zero = Decimal::ZERO;
        negative_zero.set_sign_negative(true);
        assert_ne!(PrimitiveValue::BigDecimal(negative_zero), PrimitiveValue::BigDecimal(Decimal::ZERO));
        assert_eq!(PrimitiveValue::BigDecimal(negative_zero), PrimitiveValue::BigDecimal(negative_zero));
    }

    #[test]
    fn literal_rendering() {
        assert_eq!(PrimitiveValue::from("a\"b").to_string(), r#""a\"b""#);
        assert_eq!(PrimitiveValue::Char('\'').to_string(), r"'\''");
        assert_eq!(PrimitiveValue::Long(7).to_string(), "7L");
        assert_eq!(PrimitiveValue::Double(1.0).to_string(), "1.0");
        assert_eq!(PrimitiveValue::Month(Month::May).to_string(), "May");
        assert_eq!(PrimitiveValue::ZoneOffset(-3600).to_string(), "-01:00");
    }
}
