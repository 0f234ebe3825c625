//! Operator algebra over graph inputs.
//!
//! Arithmetic on [`Input`]s and [`Signal`]s either folds to a literal, is
//! eliminated by an identity rule, or emits a `UnaryOpUGen` /
//! `BinaryOpUGen` node whose special index is the operator opcode.
//!
//! Rules applied before any node is created:
//!
//! | Expression | Result |
//! |---|---|
//! | all operands literal | folded literal (except random operators) |
//! | `x + 0`, `0 + x` | `x` |
//! | `x - 0` | `x` |
//! | `0 - x` | `neg(x)` |
//! | `x * 0`, `0 * x` | literal `0` |
//! | `x * 1`, `1 * x` | `x` |
//! | `x * -1`, `-1 * x` | `neg(x)` |
//! | `x / 1` | `x` |
//! | `x / -1` | `neg(x)` |
//!
//! [`Builder::mul_add`] applies the fused multiply-add cascade and emits a
//! `MulAdd` node when operand rates allow it. Every signal-level operation is
//! point-wise over arrays, with wrap-around for mismatched widths.

use core::fmt;
use std::f64::consts::{PI, SQRT_2};

use crate::error::Result;
use crate::graph::{Builder, Input, NodeSpec, Signal};
use crate::rate::Rate;

/// Type name of unary operator nodes.
pub const UNARY_OP_UGEN: &str = "UnaryOpUGen";
/// Type name of binary operator nodes.
pub const BINARY_OP_UGEN: &str = "BinaryOpUGen";
/// Type name of fused multiply-add nodes.
pub const MUL_ADD: &str = "MulAdd";

macro_rules! operators {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $code:literal => $label:literal $(| $alias:literal)*),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $(
                #[doc = concat!("`", $label, "`")]
                $variant = $code,
            )*
        }

        impl $name {
            /// Every operator, in opcode order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Opcode written as the node's special index.
            #[inline]
            pub const fn special_index(self) -> i32 {
                self as i32
            }

            /// Canonical operator name.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)*
                }
            }

            /// Looks up an operator by opcode.
            pub const fn from_special_index(index: i32) -> Option<Self> {
                match index {
                    $($code => Some($name::$variant),)*
                    _ => None,
                }
            }

            /// Looks up an operator by canonical name or symbolic alias.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($label $(| $alias)* => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

operators! {
    /// Unary operators understood by `UnaryOpUGen`.
    pub enum UnaryOp {
        Neg = 0 => "neg",
        Not = 1 => "not",
        IsNil = 2 => "isNil",
        NotNil = 3 => "notNil",
        BitNot = 4 => "bitNot",
        Abs = 5 => "abs",
        AsFloat = 6 => "asFloat",
        AsInt = 7 => "asInteger" | "asInt",
        Ceil = 8 => "ceil",
        Floor = 9 => "floor",
        Frac = 10 => "frac",
        Sign = 11 => "sign",
        Squared = 12 => "squared",
        Cubed = 13 => "cubed",
        Sqrt = 14 => "sqrt",
        Exp = 15 => "exp",
        Reciprocal = 16 => "reciprocal",
        MidiCps = 17 => "midicps",
        CpsMidi = 18 => "cpsmidi",
        MidiRatio = 19 => "midiratio",
        RatioMidi = 20 => "ratiomidi",
        DbAmp = 21 => "dbamp",
        AmpDb = 22 => "ampdb",
        OctCps = 23 => "octcps",
        CpsOct = 24 => "cpsoct",
        Log = 25 => "log",
        Log2 = 26 => "log2",
        Log10 = 27 => "log10",
        Sin = 28 => "sin",
        Cos = 29 => "cos",
        Tan = 30 => "tan",
        ArcSin = 31 => "asin" | "arcsin",
        ArcCos = 32 => "acos" | "arccos",
        ArcTan = 33 => "atan" | "arctan",
        SinH = 34 => "sinh",
        CosH = 35 => "cosh",
        TanH = 36 => "tanh",
        Rand = 37 => "rand",
        Rand2 = 38 => "rand2",
        LinRand = 39 => "linrand",
        BiLinRand = 40 => "bilinrand",
        Sum3Rand = 41 => "sum3rand",
        Distort = 42 => "distort",
        SoftClip = 43 => "softclip",
        Coin = 44 => "coin",
        DigitValue = 45 => "digitValue",
        Silence = 46 => "silence",
        Thru = 47 => "thru",
        RectWindow = 48 => "rectWindow",
        HanWindow = 49 => "hanWindow",
        WelWindow = 50 => "welWindow",
        TriWindow = 51 => "triWindow",
        Ramp = 52 => "ramp",
        SCurve = 53 => "scurve",
    }
}

operators! {
    /// Binary operators understood by `BinaryOpUGen`.
    pub enum BinaryOp {
        Add = 0 => "add" | "+",
        Sub = 1 => "sub" | "-",
        Mul = 2 => "mul" | "*",
        IDiv = 3 => "div",
        Div = 4 => "fdiv" | "/",
        Mod = 5 => "mod" | "%",
        Eq = 6 => "eq" | "==",
        Ne = 7 => "ne" | "!=",
        Lt = 8 => "lt" | "<",
        Gt = 9 => "gt" | ">",
        Le = 10 => "le" | "<=",
        Ge = 11 => "ge" | ">=",
        Min = 12 => "min",
        Max = 13 => "max",
        BitAnd = 14 => "bitAnd" | "&",
        BitOr = 15 => "bitOr" | "|",
        BitXor = 16 => "bitXor",
        Lcm = 17 => "lcm",
        Gcd = 18 => "gcd",
        Round = 19 => "round",
        RoundUp = 20 => "roundUp",
        Trunc = 21 => "trunc",
        Atan2 = 22 => "atan2",
        Hypot = 23 => "hypot",
        HypotApx = 24 => "hypotApx",
        Pow = 25 => "pow" | "**",
        Shl = 26 => "leftShift" | "<<",
        Shr = 27 => "rightShift" | ">>",
        UShr = 28 => "unsignedRightShift" | "+>>",
        Fill = 29 => "fill",
        Ring1 = 30 => "ring1",
        Ring2 = 31 => "ring2",
        Ring3 = 32 => "ring3",
        Ring4 = 33 => "ring4",
        DifSqr = 34 => "difsqr",
        SumSqr = 35 => "sumsqr",
        SqrSum = 36 => "sqrsum",
        SqrDif = 37 => "sqrdif",
        AbsDif = 38 => "absdif",
        Thresh = 39 => "thresh",
        AmClip = 40 => "amclip",
        ScaleNeg = 41 => "scaleneg",
        Clip2 = 42 => "clip2",
        Excess = 43 => "excess",
        Fold2 = 44 => "fold2",
        Wrap2 = 45 => "wrap2",
        FirstArg = 46 => "firstArg",
        RandRange = 47 => "rrand",
        ExpRandRange = 48 => "exprand",
    }
}

fn truth(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn fold_range(x: f64, lo: f64, hi: f64) -> f64 {
    let range = hi - lo;
    if range == 0.0 {
        return lo;
    }
    let range2 = range * 2.0;
    let mut c = (x - lo) - range2 * ((x - lo) / range2).floor();
    if c >= range {
        c = range2 - c;
    }
    c + lo
}

fn wrap_range(x: f64, lo: f64, hi: f64) -> f64 {
    let range = hi - lo;
    if range == 0.0 {
        return lo;
    }
    x - range * ((x - lo) / range).floor()
}

impl UnaryOp {
    /// True for operators whose result is random; they are never folded.
    pub const fn is_random(self) -> bool {
        matches!(
            self,
            UnaryOp::Rand
                | UnaryOp::Rand2
                | UnaryOp::LinRand
                | UnaryOp::BiLinRand
                | UnaryOp::Sum3Rand
                | UnaryOp::Coin
        )
    }

    /// Evaluates the operator on a literal. `None` when it cannot be folded.
    pub fn fold(self, a: f32) -> Option<f32> {
        let x = f64::from(a);
        let y = match self {
            UnaryOp::Neg => -x,
            UnaryOp::Not => truth(x <= 0.0),
            UnaryOp::IsNil => 0.0,
            UnaryOp::NotNil => 1.0,
            UnaryOp::BitNot => f64::from(!(x as i32)),
            UnaryOp::Abs => x.abs(),
            UnaryOp::AsFloat | UnaryOp::Thru => x,
            UnaryOp::AsInt => x.trunc(),
            UnaryOp::Ceil => x.ceil(),
            UnaryOp::Floor => x.floor(),
            UnaryOp::Frac => x - x.floor(),
            UnaryOp::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            UnaryOp::Squared => x * x,
            UnaryOp::Cubed => x * x * x,
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Reciprocal => 1.0 / x,
            UnaryOp::MidiCps => 440.0 * ((x - 69.0) / 12.0).exp2(),
            UnaryOp::CpsMidi => (x / 440.0).log2() * 12.0 + 69.0,
            UnaryOp::MidiRatio => (x / 12.0).exp2(),
            UnaryOp::RatioMidi => 12.0 * x.log2(),
            UnaryOp::DbAmp => 10f64.powf(x / 20.0),
            UnaryOp::AmpDb => 20.0 * x.log10(),
            UnaryOp::OctCps => 440.0 * (x - 4.75).exp2(),
            UnaryOp::CpsOct => (x / 440.0).log2() + 4.75,
            UnaryOp::Log => x.ln(),
            UnaryOp::Log2 => x.log2(),
            UnaryOp::Log10 => x.log10(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::ArcSin => x.asin(),
            UnaryOp::ArcCos => x.acos(),
            UnaryOp::ArcTan => x.atan(),
            UnaryOp::SinH => x.sinh(),
            UnaryOp::CosH => x.cosh(),
            UnaryOp::TanH => x.tanh(),
            UnaryOp::Distort => x / (1.0 + x.abs()),
            UnaryOp::SoftClip => {
                let ax = x.abs();
                if ax <= 0.5 { x } else { (ax - 0.25) / x }
            }
            UnaryOp::Silence => 0.0,
            UnaryOp::RectWindow => truth((0.0..=1.0).contains(&x)),
            UnaryOp::HanWindow => {
                if (0.0..=1.0).contains(&x) {
                    0.5 - 0.5 * (2.0 * PI * x).cos()
                } else {
                    0.0
                }
            }
            UnaryOp::WelWindow => {
                if (0.0..=1.0).contains(&x) {
                    (PI * x).sin()
                } else {
                    0.0
                }
            }
            UnaryOp::TriWindow => {
                if !(0.0..=1.0).contains(&x) {
                    0.0
                } else if x < 0.5 {
                    2.0 * x
                } else {
                    -2.0 * x + 2.0
                }
            }
            UnaryOp::Ramp => x.clamp(0.0, 1.0),
            UnaryOp::SCurve => {
                let t = x.clamp(0.0, 1.0);
                t * t * (3.0 - 2.0 * t)
            }
            UnaryOp::DigitValue
            | UnaryOp::Rand
            | UnaryOp::Rand2
            | UnaryOp::LinRand
            | UnaryOp::BiLinRand
            | UnaryOp::Sum3Rand
            | UnaryOp::Coin => return None,
        };
        Some(y as f32)
    }
}

impl BinaryOp {
    /// True for operators whose result is random; they are never folded.
    pub const fn is_random(self) -> bool {
        matches!(self, BinaryOp::RandRange | BinaryOp::ExpRandRange)
    }

    /// Evaluates the operator on two literals. `None` when it cannot be folded.
    pub fn fold(self, a: f32, b: f32) -> Option<f32> {
        let (x, y) = (f64::from(a), f64::from(b));
        let (ix, iy) = (x as i64, y as i64);
        let r = match self {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::IDiv => {
                if iy == 0 {
                    0.0
                } else {
                    (ix / iy) as f64
                }
            }
            BinaryOp::Div => x / y,
            BinaryOp::Mod => {
                if y == 0.0 {
                    x
                } else {
                    x - y * (x / y).floor()
                }
            }
            BinaryOp::Eq => truth(x == y),
            BinaryOp::Ne => truth(x != y),
            BinaryOp::Lt => truth(x < y),
            BinaryOp::Gt => truth(x > y),
            BinaryOp::Le => truth(x <= y),
            BinaryOp::Ge => truth(x >= y),
            BinaryOp::Min => x.min(y),
            BinaryOp::Max => x.max(y),
            BinaryOp::BitAnd => (ix & iy) as f64,
            BinaryOp::BitOr => (ix | iy) as f64,
            BinaryOp::BitXor => (ix ^ iy) as f64,
            BinaryOp::Lcm => {
                let g = gcd(ix, iy);
                if g == 0 { 0.0 } else { (ix / g * iy).abs() as f64 }
            }
            BinaryOp::Gcd => gcd(ix, iy) as f64,
            BinaryOp::Round => {
                if y == 0.0 {
                    x
                } else {
                    (x / y + 0.5).floor() * y
                }
            }
            BinaryOp::RoundUp => {
                if y == 0.0 {
                    x
                } else {
                    (x / y).ceil() * y
                }
            }
            BinaryOp::Trunc => {
                if y == 0.0 {
                    x
                } else {
                    (x / y).floor() * y
                }
            }
            BinaryOp::Atan2 => x.atan2(y),
            BinaryOp::Hypot => x.hypot(y),
            BinaryOp::HypotApx => {
                let (ax, ay) = (x.abs(), y.abs());
                ax + ay - (SQRT_2 - 1.0) * ax.min(ay)
            }
            BinaryOp::Pow => x.powf(y),
            BinaryOp::Shl => ((ix as i32).wrapping_shl(iy as u32)) as f64,
            BinaryOp::Shr => ((ix as i32).wrapping_shr(iy as u32)) as f64,
            BinaryOp::UShr => ((ix as u32).wrapping_shr(iy as u32)) as f64,
            BinaryOp::Ring1 => x * y + x,
            BinaryOp::Ring2 => x * y + x + y,
            BinaryOp::Ring3 => x * x * y,
            BinaryOp::Ring4 => x * x * y - x * y * y,
            BinaryOp::DifSqr => x * x - y * y,
            BinaryOp::SumSqr => x * x + y * y,
            BinaryOp::SqrSum => (x + y) * (x + y),
            BinaryOp::SqrDif => (x - y) * (x - y),
            BinaryOp::AbsDif => (x - y).abs(),
            BinaryOp::Thresh => {
                if x < y {
                    0.0
                } else {
                    x
                }
            }
            BinaryOp::AmClip => {
                if y <= 0.0 {
                    0.0
                } else {
                    x * y
                }
            }
            BinaryOp::ScaleNeg => {
                if x < 0.0 {
                    x * y
                } else {
                    x
                }
            }
            BinaryOp::Clip2 => x.max(-y).min(y),
            BinaryOp::Excess => x - x.max(-y).min(y),
            BinaryOp::Fold2 => fold_range(x, -y, y),
            BinaryOp::Wrap2 => wrap_range(x, -y, y),
            BinaryOp::FirstArg => x,
            BinaryOp::Fill | BinaryOp::RandRange | BinaryOp::ExpRandRange => return None,
        };
        Some(r as f32)
    }
}

/// True when a `MulAdd` node with inputs `(input, mul, add)` may be emitted.
///
/// The first input must run at audio rate, or at control rate with the other
/// two at control rate or slower.
pub fn can_be_mul_add(input: Input, mul: Input, add: Input) -> bool {
    match input.rate() {
        Rate::Audio => true,
        Rate::Control => {
            mul.rate() <= Rate::Control && add.rate() <= Rate::Control
        }
        Rate::Scalar | Rate::Demand => false,
    }
}

impl Builder {
    /// Applies a unary operator to one input.
    pub fn unary(&mut self, op: UnaryOp, a: Input) -> Result<Input> {
        if let Input::Constant(x) = a
            && let Some(folded) = op.fold(x)
        {
            #[cfg(feature = "tracing")]
            tracing::debug!("fold: {op}({x}) = {folded}");
            return Ok(Input::Constant(folded));
        }
        let spec = NodeSpec::new(UNARY_OP_UGEN, a.rate()).special_index(op.special_index());
        Ok(Input::Wire(self.add_node(&spec, vec![a])?[0]))
    }

    /// Applies a binary operator to two inputs.
    pub fn binary(&mut self, op: BinaryOp, a: Input, b: Input) -> Result<Input> {
        if let (Input::Constant(x), Input::Constant(y)) = (a, b)
            && let Some(folded) = op.fold(x, y)
        {
            #[cfg(feature = "tracing")]
            tracing::debug!("fold: {op}({x}, {y}) = {folded}");
            return Ok(Input::Constant(folded));
        }

        match op {
            BinaryOp::Mul => {
                if a.is_constant(0.0) || b.is_constant(0.0) {
                    return Ok(Input::Constant(0.0));
                }
                if a.is_constant(1.0) {
                    return Ok(b);
                }
                if a.is_constant(-1.0) {
                    return self.unary(UnaryOp::Neg, b);
                }
                if b.is_constant(1.0) {
                    return Ok(a);
                }
                if b.is_constant(-1.0) {
                    return self.unary(UnaryOp::Neg, a);
                }
            }
            BinaryOp::Add => {
                if a.is_constant(0.0) {
                    return Ok(b);
                }
                if b.is_constant(0.0) {
                    return Ok(a);
                }
            }
            BinaryOp::Sub => {
                if a.is_constant(0.0) {
                    return self.unary(UnaryOp::Neg, b);
                }
                if b.is_constant(0.0) {
                    return Ok(a);
                }
            }
            BinaryOp::Div => {
                if b.is_constant(1.0) {
                    return Ok(a);
                }
                if b.is_constant(-1.0) {
                    return self.unary(UnaryOp::Neg, a);
                }
            }
            _ => {}
        }

        let rate = Rate::combine([a.rate(), b.rate()]);
        let spec = NodeSpec::new(BINARY_OP_UGEN, rate).special_index(op.special_index());
        Ok(Input::Wire(self.add_node(&spec, vec![a, b])?[0]))
    }

    /// Fused multiply-add of single inputs: `input * mul + add`.
    pub fn mul_add_input(&mut self, input: Input, mul: Input, add: Input) -> Result<Input> {
        if mul.is_constant(0.0) {
            return Ok(add);
        }
        let add_zero = add.is_constant(0.0);
        if mul.is_constant(1.0) && add_zero {
            return Ok(input);
        }
        if mul.is_constant(-1.0) && add_zero {
            return self.unary(UnaryOp::Neg, input);
        }
        if add_zero {
            return self.binary(BinaryOp::Mul, input, mul);
        }
        if mul.is_constant(-1.0) {
            return self.binary(BinaryOp::Sub, add, input);
        }
        if mul.is_constant(1.0) {
            return self.binary(BinaryOp::Add, input, add);
        }

        let fused = if can_be_mul_add(input, mul, add) {
            Some([input, mul, add])
        } else if can_be_mul_add(mul, input, add) {
            Some([mul, input, add])
        } else {
            None
        };
        if let Some(inputs) = fused {
            let rate = Rate::combine(inputs.iter().map(Input::rate));
            let wire = self.add_node(&NodeSpec::new(MUL_ADD, rate), inputs.to_vec())?[0];
            return Ok(Input::Wire(wire));
        }

        let product = self.binary(BinaryOp::Mul, input, mul)?;
        self.binary(BinaryOp::Add, product, add)
    }

    /// Applies a unary operator point-wise over a signal.
    pub fn unary_op(&mut self, op: UnaryOp, a: impl Into<Signal>) -> Result<Signal> {
        self.map1(op, &a.into())
    }

    fn map1(&mut self, op: UnaryOp, a: &Signal) -> Result<Signal> {
        match a {
            Signal::One(x) => Ok(Signal::One(self.unary(op, *x)?)),
            Signal::Many(items) => items
                .iter()
                .map(|item| self.map1(op, item))
                .collect::<Result<Vec<_>>>()
                .map(Signal::Many),
        }
    }

    /// Applies a binary operator point-wise over two signals.
    ///
    /// Arrays of different widths wrap around; the result has the width of
    /// the wider operand.
    pub fn binary_op(&mut self, op: BinaryOp, a: impl Into<Signal>, b: impl Into<Signal>) -> Result<Signal> {
        self.map2(op, &a.into(), &b.into())
    }

    fn map2(&mut self, op: BinaryOp, a: &Signal, b: &Signal) -> Result<Signal> {
        if let (Signal::One(x), Signal::One(y)) = (a, b) {
            return Ok(Signal::One(self.binary(op, *x, *y)?));
        }
        let width = pointwise_width(&[a, b]);
        (0..width)
            .map(|i| self.map2(op, &a.channel(i), &b.channel(i)))
            .collect::<Result<Vec<_>>>()
            .map(Signal::Many)
    }

    /// `a + b`, point-wise.
    pub fn add(&mut self, a: impl Into<Signal>, b: impl Into<Signal>) -> Result<Signal> {
        self.binary_op(BinaryOp::Add, a, b)
    }

    /// `a - b`, point-wise.
    pub fn sub(&mut self, a: impl Into<Signal>, b: impl Into<Signal>) -> Result<Signal> {
        self.binary_op(BinaryOp::Sub, a, b)
    }

    /// `a * b`, point-wise.
    pub fn mul(&mut self, a: impl Into<Signal>, b: impl Into<Signal>) -> Result<Signal> {
        self.binary_op(BinaryOp::Mul, a, b)
    }

    /// `a / b`, point-wise.
    pub fn div(&mut self, a: impl Into<Signal>, b: impl Into<Signal>) -> Result<Signal> {
        self.binary_op(BinaryOp::Div, a, b)
    }

    /// `-a`, point-wise.
    pub fn neg(&mut self, a: impl Into<Signal>) -> Result<Signal> {
        self.unary_op(UnaryOp::Neg, a)
    }

    /// Fused multiply-add `input * mul + add`, point-wise.
    pub fn mul_add(
        &mut self,
        input: impl Into<Signal>,
        mul: impl Into<Signal>,
        add: impl Into<Signal>,
    ) -> Result<Signal> {
        self.map3(&input.into(), &mul.into(), &add.into())
    }

    fn map3(&mut self, input: &Signal, mul: &Signal, add: &Signal) -> Result<Signal> {
        if let (Signal::One(i), Signal::One(m), Signal::One(a)) = (input, mul, add) {
            return Ok(Signal::One(self.mul_add_input(*i, *m, *a)?));
        }
        let width = pointwise_width(&[input, mul, add]);
        (0..width)
            .map(|i| self.map3(&input.channel(i), &mul.channel(i), &add.channel(i)))
            .collect::<Result<Vec<_>>>()
            .map(Signal::Many)
    }
}

/// Width of a point-wise operation: the widest array, or 0 if any operand
/// is an empty array.
fn pointwise_width(operands: &[&Signal]) -> usize {
    if operands.iter().any(|s| s.is_empty()) {
        return 0;
    }
    operands
        .iter()
        .filter(|s| matches!(s, Signal::Many(_)))
        .map(|s| s.width())
        .max()
        .unwrap_or(1)
}
