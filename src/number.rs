use crate::errors::*;
use num_complex::Complex64;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Zero};
use std::cmp::Ordering;
use std::num::IntErrorKind;

#[derive(Clone, Copy, Debug)]
pub enum Number {
    Integer(i64),
    Fraction(Rational64),
    Float(f64),
    Complex(Complex64),
    NaN,
    Infinite,
}

impl Number {
    /// Exact quotient in lowest terms. A denominator of one collapses to an
    /// integer, a zero denominator to `Infinite` (or `NaN` for 0/0).
    pub fn fraction(numerator: i64, denominator: i64) -> Self {
        if denominator == 0 {
            return if numerator == 0 {
                Number::NaN
            } else {
                Number::Infinite
            };
        }
        Number::from_ratio(Rational64::new(numerator, denominator))
    }

    pub fn from_ratio(r: Rational64) -> Self {
        if *r.denom() == 1 {
            Number::Integer(*r.numer())
        } else {
            Number::Fraction(r)
        }
    }

    pub fn float(x: f64) -> Self {
        if x.is_nan() {
            Number::NaN
        } else if x.is_infinite() {
            Number::Infinite
        } else {
            Number::Float(x)
        }
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Number::Complex(Complex64::new(re, im))
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::Fraction(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => *i == 0,
            Number::Fraction(r) => r.is_zero(),
            Number::Float(x) => *x == 0.0,
            Number::Complex(c) => c.is_zero(),
            Number::NaN | Number::Infinite => false,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Number::Integer(i) => Some(*i as f64),
            Number::Fraction(r) => Some(*r.numer() as f64 / *r.denom() as f64),
            Number::Float(x) => Some(*x),
            Number::NaN => Some(f64::NAN),
            Number::Infinite => Some(f64::INFINITY),
            Number::Complex(_) => None,
        }
    }

    fn to_ratio(&self) -> Option<Rational64> {
        match self {
            Number::Integer(i) => Some(Rational64::from_integer(*i)),
            Number::Fraction(r) => Some(*r),
            _ => None,
        }
    }

    fn arith(
        self,
        other: Self,
        int_op: fn(i64, i64) -> Option<i64>,
        ratio_op: fn(&Rational64, &Rational64) -> Option<Rational64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Number> {
        use Number::*;
        match (self, other) {
            (Complex(_), _) | (_, Complex(_)) => {
                Err(RuntimeErrorKind::Unimplemented("complex arithmetic").into())
            }
            (NaN, _) | (_, NaN) => Ok(NaN),
            (Integer(a), Integer(b)) => match int_op(a, b) {
                Some(i) => Ok(Integer(i)),
                None => self.exact_or_float(other, ratio_op, float_op),
            },
            _ => self.exact_or_float(other, ratio_op, float_op),
        }
    }

    fn exact_or_float(
        self,
        other: Self,
        ratio_op: fn(&Rational64, &Rational64) -> Option<Rational64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Number> {
        if let (Some(a), Some(b)) = (self.to_ratio(), other.to_ratio()) {
            if let Some(r) = ratio_op(&a, &b) {
                return Ok(Number::from_ratio(r));
            }
        }
        match (self.to_f64(), other.to_f64()) {
            (Some(a), Some(b)) => Ok(Number::float(float_op(a, b))),
            _ => Err(RuntimeErrorKind::Unimplemented("complex arithmetic").into()),
        }
    }

    /// Ordering over the reals. `None` when either side is NaN or complex.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        use Number::*;
        match (self, other) {
            (Complex(_), _) | (_, Complex(_)) | (NaN, _) | (_, NaN) => None,
            (Infinite, Infinite) => Some(Ordering::Equal),
            _ => match (self.to_ratio(), other.to_ratio()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => self.to_f64()?.partial_cmp(&other.to_f64()?),
            },
        }
    }

    /// Same exactness and same value.
    pub fn eqv(&self, other: &Self) -> bool {
        use Number::*;
        match (self, other) {
            (Integer(a), Integer(b)) => a == b,
            (Fraction(a), Fraction(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Complex(a), Complex(b)) => a == b,
            (Infinite, Infinite) => true,
            _ => false,
        }
    }
}

impl std::ops::Add for Number {
    type Output = Result<Number>;
    fn add(self, other: Self) -> Self::Output {
        self.arith(
            other,
            |a, b| a.checked_add(b),
            |a, b| a.checked_add(b),
            |a, b| a + b,
        )
    }
}

impl std::ops::Sub for Number {
    type Output = Result<Number>;
    fn sub(self, other: Self) -> Self::Output {
        self.arith(
            other,
            |a, b| a.checked_sub(b),
            |a, b| a.checked_sub(b),
            |a, b| a - b,
        )
    }
}

impl std::ops::Mul for Number {
    type Output = Result<Number>;
    fn mul(self, other: Self) -> Self::Output {
        self.arith(
            other,
            |a, b| a.checked_mul(b),
            |a, b| a.checked_mul(b),
            |a, b| a * b,
        )
    }
}

impl std::ops::Div for Number {
    type Output = Result<Number>;
    fn div(self, other: Self) -> Self::Output {
        if other.is_exact() && other.is_zero() {
            return match self {
                Number::Complex(_) => {
                    Err(RuntimeErrorKind::Unimplemented("complex arithmetic").into())
                }
                n if n.is_zero() => Ok(Number::NaN),
                Number::NaN => Ok(Number::NaN),
                _ => Ok(Number::Infinite),
            };
        }
        self.arith(
            other,
            |a, b| match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                _ => None,
            },
            |a, b| a.checked_div(b),
            |a, b| a / b,
        )
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Complex(a), Number::Complex(b)) => a == b,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Integer(i)
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Number::float(x)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Fraction(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Number::Float(x) => write!(f, "{:?}", x),
            Number::Complex(c) if c.im < 0.0 => write!(f, "{:?}{:?}i", c.re, c.im),
            Number::Complex(c) => write!(f, "{:?}+{:?}i", c.re, c.im),
            Number::NaN => write!(f, "+nan.0"),
            Number::Infinite => write!(f, "+inf.0"),
        }
    }
}

/// Convert the text of a number token, including an optional radix prefix.
pub fn parse_literal(text: &str) -> Option<Number> {
    let (radix, body) = match text.get(..2) {
        Some("#b") => (2, &text[2..]),
        Some("#o") => (8, &text[2..]),
        Some("#d") => (10, &text[2..]),
        Some("#x") => (16, &text[2..]),
        _ => (10, text),
    };

    match body.strip_suffix('i') {
        Some(complex) if radix != 16 => parse_complex(complex, radix),
        _ => parse_real(body, radix),
    }
}

fn parse_real(s: &str, radix: u32) -> Option<Number> {
    if let Some(idx) = s.find('/') {
        let numerator = i64::from_str_radix(&s[..idx], radix).ok()?;
        let denominator = i64::from_str_radix(&s[idx + 1..], radix).ok()?;
        return Some(Number::fraction(numerator, denominator));
    }

    if s.contains('.') {
        return if radix == 10 {
            s.parse::<f64>().ok().map(Number::float)
        } else {
            parse_fixed_point(s, radix)
        };
    }

    match i64::from_str_radix(s, radix) {
        Ok(i) => Some(Number::Integer(i)),
        // out of range literals degrade like overflowing arithmetic
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            parse_wide_integer(s, radix).map(Number::float)
        }
        Err(_) => None,
    }
}

fn parse_wide_integer(s: &str, radix: u32) -> Option<f64> {
    let (negative, digits) = match s.chars().next() {
        Some('-') => (true, &s[1..]),
        Some('+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits.chars().try_fold(0.0, |acc, ch| {
        ch.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Fixed-point literal in a non-decimal radix, e.g. `#b10.1` = 2.5
fn parse_fixed_point(s: &str, radix: u32) -> Option<Number> {
    let (negative, s) = match s.chars().next() {
        Some('-') => (true, &s[1..]),
        Some('+') => (false, &s[1..]),
        _ => (false, s),
    };
    let dot = s.find('.')?;
    let (int_part, frac_part) = (&s[..dot], &s[dot + 1..]);

    let int = if int_part.is_empty() {
        0.0
    } else {
        i64::from_str_radix(int_part, radix).ok()? as f64
    };
    let frac = frac_part.chars().rev().try_fold(0.0, |acc, ch| {
        ch.to_digit(radix)
            .map(|d| (acc + d as f64) / radix as f64)
    })?;

    let value = int + frac;
    Some(Number::float(if negative { -value } else { value }))
}

fn parse_complex(s: &str, radix: u32) -> Option<Number> {
    let split = s
        .char_indices()
        .filter(|&(i, ch)| i > 0 && (ch == '+' || ch == '-'))
        .map(|(i, _)| i)
        .last();

    let (real, imag) = match split {
        Some(i) => (parse_real(&s[..i], radix)?.to_f64()?, &s[i..]),
        None => (0.0, s),
    };

    let imag = match imag {
        "+" | "" => 1.0,
        "-" => -1.0,
        _ => parse_real(imag, radix)?.to_f64()?,
    };

    Some(Number::complex(real, imag))
}
