//! Restricted algebra engine for operand-argument computations.
//!
//! Opmeta may declare a bit field's stored value as a computation over the
//! surface value, e.g. `"arg * 2 + 1"`. Encoding evaluates the expression
//! with the surface value bound to the symbol; decoding solves the equation
//! `expr(x) = stored` for the single free symbol. Only linear arithmetic over
//! one symbol is supported; anything else is a hard failure, never an
//! approximation.

use thiserror::Error;

/// Failure modes of computation evaluation and solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AlgebraError {
    #[error("malformed computation expression")]
    Malformed,
    #[error("computation is not linear in its symbol")]
    NonLinear,
    #[error("division by zero in computation")]
    DivisionByZero,
    #[error("division is not exact")]
    InexactDivision,
    #[error("computation is not invertible")]
    NotInvertible,
    #[error("arithmetic overflow in computation")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A parsed computation expression over one free symbol.
///
/// All identifiers refer to the same symbol; opmeta computations name the
/// operand argument they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Num(i64),
    Sym,
    Bin(BinOp, Box<Expr>, Box<Expr>),
}

/// Exact rational used for linear-coefficient extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frac {
    num: i128,
    den: i128,
}

impl Frac {
    const ZERO: Frac = Frac { num: 0, den: 1 };

    fn int(n: i128) -> Self {
        Frac { num: n, den: 1 }
    }

    fn normalize(self) -> Self {
        let g = gcd(self.num.unsigned_abs(), self.den.unsigned_abs()).max(1) as i128;
        let sign = if self.den < 0 { -1 } else { 1 };
        Frac {
            num: sign * self.num / g,
            den: sign * self.den / g,
        }
    }

    fn add(self, other: Frac) -> Result<Frac, AlgebraError> {
        let num = self
            .num
            .checked_mul(other.den)
            .and_then(|a| other.num.checked_mul(self.den).and_then(|b| a.checked_add(b)))
            .ok_or(AlgebraError::Overflow)?;
        let den = self.den.checked_mul(other.den).ok_or(AlgebraError::Overflow)?;
        Ok(Frac { num, den }.normalize())
    }

    fn sub(self, other: Frac) -> Result<Frac, AlgebraError> {
        self.add(Frac {
            num: -other.num,
            den: other.den,
        })
    }

    fn mul(self, other: Frac) -> Result<Frac, AlgebraError> {
        let num = self.num.checked_mul(other.num).ok_or(AlgebraError::Overflow)?;
        let den = self.den.checked_mul(other.den).ok_or(AlgebraError::Overflow)?;
        Ok(Frac { num, den }.normalize())
    }

    fn div(self, other: Frac) -> Result<Frac, AlgebraError> {
        if other.num == 0 {
            return Err(AlgebraError::DivisionByZero);
        }
        self.mul(Frac {
            num: other.den,
            den: other.num,
        })
    }

    fn is_zero(self) -> bool {
        self.num == 0
    }

    /// The exact integer value, if this fraction is one.
    fn to_int(self) -> Option<i128> {
        let n = self.normalize();
        (n.den == 1).then_some(n.num)
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Expr {
    /// Parse a computation expression.
    pub fn parse(src: &str) -> Result<Expr, AlgebraError> {
        let mut parser = ExprParser {
            bytes: src.as_bytes(),
            pos: 0,
        };
        let expr = parser.expr()?;
        parser.skip_ws();
        if parser.pos != parser.bytes.len() {
            return Err(AlgebraError::Malformed);
        }
        Ok(expr)
    }

    /// Evaluate with the symbol bound to `x`. Division must be exact.
    pub fn eval(&self, x: i64) -> Result<i64, AlgebraError> {
        match self {
            Expr::Num(n) => Ok(*n),
            Expr::Sym => Ok(x),
            Expr::Bin(op, lhs, rhs) => {
                let a = lhs.eval(x)?;
                let b = rhs.eval(x)?;
                match op {
                    BinOp::Add => a.checked_add(b).ok_or(AlgebraError::Overflow),
                    BinOp::Sub => a.checked_sub(b).ok_or(AlgebraError::Overflow),
                    BinOp::Mul => a.checked_mul(b).ok_or(AlgebraError::Overflow),
                    BinOp::Div => {
                        if b == 0 {
                            Err(AlgebraError::DivisionByZero)
                        } else if a % b != 0 {
                            Err(AlgebraError::InexactDivision)
                        } else {
                            Ok(a / b)
                        }
                    }
                }
            }
        }
    }

    /// Solve `self(x) = target` for the symbol.
    ///
    /// Extracts the linear form `a*x + b` over exact rationals and isolates
    /// the symbol; fails when the expression is non-linear, has a zero
    /// coefficient, or the solution is not an integer.
    pub fn solve(&self, target: i64) -> Result<i64, AlgebraError> {
        let (coeff, constant) = self.linear()?;
        if coeff.is_zero() {
            return Err(AlgebraError::NotInvertible);
        }
        let x = Frac::int(target as i128).sub(constant)?.div(coeff)?;
        let value = x.to_int().ok_or(AlgebraError::InexactDivision)?;
        i64::try_from(value).map_err(|_| AlgebraError::Overflow)
    }

    /// Linear form `(coefficient of x, constant term)`.
    fn linear(&self) -> Result<(Frac, Frac), AlgebraError> {
        match self {
            Expr::Num(n) => Ok((Frac::ZERO, Frac::int(*n as i128))),
            Expr::Sym => Ok((Frac::int(1), Frac::ZERO)),
            Expr::Bin(op, lhs, rhs) => {
                let (la, lb) = lhs.linear()?;
                let (ra, rb) = rhs.linear()?;
                match op {
                    BinOp::Add => Ok((la.add(ra)?, lb.add(rb)?)),
                    BinOp::Sub => Ok((la.sub(ra)?, lb.sub(rb)?)),
                    BinOp::Mul => {
                        // (la*x + lb)(ra*x + rb) stays linear only when one
                        // side is constant.
                        if !la.is_zero() && !ra.is_zero() {
                            return Err(AlgebraError::NonLinear);
                        }
                        Ok((la.mul(rb)?.add(ra.mul(lb)?)?, lb.mul(rb)?))
                    }
                    BinOp::Div => {
                        if !ra.is_zero() {
                            return Err(AlgebraError::NonLinear);
                        }
                        Ok((la.div(rb)?, lb.div(rb)?))
                    }
                }
            }
        }
    }
}

struct ExprParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl ExprParser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<Expr, AlgebraError> {
        let mut lhs = self.term()?;
        while let Some(b) = self.peek() {
            let op = match b {
                b'+' => BinOp::Add,
                b'-' => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, AlgebraError> {
        let mut lhs = self.factor()?;
        while let Some(b) = self.peek() {
            let op = match b {
                b'*' => BinOp::Mul,
                b'/' => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Expr, AlgebraError> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let inner = self.expr()?;
                if self.peek() != Some(b')') {
                    return Err(AlgebraError::Malformed);
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(b'-') => {
                self.pos += 1;
                let inner = self.factor()?;
                Ok(Expr::Bin(
                    BinOp::Sub,
                    Box::new(Expr::Num(0)),
                    Box::new(inner),
                ))
            }
            Some(b) if b.is_ascii_digit() => {
                let start = self.pos;
                while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
                std::str::from_utf8(&self.bytes[start..self.pos])
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .map(Expr::Num)
                    .ok_or(AlgebraError::Malformed)
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                // Any identifier is the one free symbol.
                while self.pos < self.bytes.len()
                    && (self.bytes[self.pos].is_ascii_alphanumeric()
                        || self.bytes[self.pos] == b'_'
                        || self.bytes[self.pos] == b'-' && self.identifier_continues())
                {
                    self.pos += 1;
                }
                Ok(Expr::Sym)
            }
            _ => Err(AlgebraError::Malformed),
        }
    }

    /// A `-` continues an identifier only when followed by another identifier
    /// character, so `arg-width` reads as one symbol but `arg - 1` does not.
    fn identifier_continues(&self) -> bool {
        self.bytes
            .get(self.pos + 1)
            .is_some_and(|b| b.is_ascii_alphanumeric())
    }
}
