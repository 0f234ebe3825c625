//! Breakpoint envelopes and their flat literal layouts.
//!
//! An [`Env`] never becomes a node. It flattens into a list of literals that
//! an envelope node takes as ordinary trailing inputs:
//!
//! ```text
//! flatten:                  [level0, n, release, loop, (level, time, shape, curve) * n]
//! flatten_for_interpolation: [offset, level0, n, total, (time, shape, curve, level) * n]
//! ```
//!
//! Missing release and loop nodes are written as `-99`. A curve list shorter
//! than the segment list cycles.

use core::fmt;
use core::str::FromStr;

use crate::error::{Result, SynthDefError};
use crate::graph::Signal;

/// Marker written for an absent release or loop node.
pub const NO_NODE: f32 = -99.0;

/// Segment curve.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Curve {
    /// Jump to the end level at the start of the segment.
    Step,
    /// Straight line.
    #[default]
    Linear,
    /// Exponential; levels must be non-zero and share a sign.
    Exponential,
    /// Half sine.
    Sine,
    /// Welch (quarter sine).
    Welch,
    /// Curvature value: 0 is linear, positive bends down, negative bends up.
    Numeric(f32),
    /// Squared.
    Squared,
    /// Cubed.
    Cubed,
    /// Hold the start level until the end of the segment.
    Hold,
}

impl Curve {
    /// Shape code written to the envelope array.
    pub fn shape_code(self) -> i32 {
        match self {
            Curve::Step => 0,
            Curve::Linear => 1,
            Curve::Exponential => 2,
            Curve::Sine => 3,
            Curve::Welch => 4,
            Curve::Numeric(_) => 5,
            Curve::Squared => 6,
            Curve::Cubed => 7,
            Curve::Hold => 8,
        }
    }

    /// Curvature written after the shape code; zero for named curves.
    pub fn value(self) -> f32 {
        match self {
            Curve::Numeric(v) => v,
            _ => 0.0,
        }
    }
}

impl FromStr for Curve {
    type Err = SynthDefError;

    /// Parses a curve name, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "step" => Ok(Curve::Step),
            "lin" | "linear" => Ok(Curve::Linear),
            "exp" | "exponential" => Ok(Curve::Exponential),
            "sin" | "sine" => Ok(Curve::Sine),
            "wel" | "welch" => Ok(Curve::Welch),
            "sqr" | "squared" => Ok(Curve::Squared),
            "cub" | "cubed" => Ok(Curve::Cubed),
            "hold" => Ok(Curve::Hold),
            _ => Err(SynthDefError::UnknownCurve(s.to_string())),
        }
    }
}

impl From<f32> for Curve {
    fn from(value: f32) -> Self {
        Curve::Numeric(value)
    }
}

impl From<f64> for Curve {
    fn from(value: f64) -> Self {
        Curve::Numeric(value as f32)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::Step => f.write_str("step"),
            Curve::Linear => f.write_str("lin"),
            Curve::Exponential => f.write_str("exp"),
            Curve::Sine => f.write_str("sin"),
            Curve::Welch => f.write_str("wel"),
            Curve::Numeric(v) => write!(f, "{v}"),
            Curve::Squared => f.write_str("sqr"),
            Curve::Cubed => f.write_str("cub"),
            Curve::Hold => f.write_str("hold"),
        }
    }
}

/// Parses a list of curve names.
pub fn parse_curves<S: AsRef<str>>(names: &[S]) -> Result<Vec<Curve>> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}

/// A breakpoint envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct Env {
    levels: Vec<f32>,
    times: Vec<f32>,
    curves: Vec<Curve>,
    release_node: Option<usize>,
    loop_node: Option<usize>,
    offset: f32,
}

impl Env {
    /// Creates an envelope from `n + 1` levels, `n` segment times, and a
    /// curve list that cycles. An empty curve list means linear.
    pub fn new(levels: Vec<f32>, times: Vec<f32>, curves: Vec<Curve>) -> Result<Self> {
        if levels.is_empty() || levels.len() != times.len() + 1 {
            return Err(SynthDefError::InvalidEnvelope {
                levels: levels.len(),
                times: times.len(),
            });
        }
        let curves = if curves.is_empty() {
            vec![Curve::Linear]
        } else {
            curves
        };
        Ok(Self {
            levels,
            times,
            curves,
            release_node: None,
            loop_node: None,
            offset: 0.0,
        })
    }

    /// Sets the node at which the envelope sustains until released.
    pub fn with_release_node(mut self, node: usize) -> Self {
        self.release_node = Some(node);
        self
    }

    /// Sets the node the envelope loops back to from the release node.
    pub fn with_loop_node(mut self, node: usize) -> Self {
        self.loop_node = Some(node);
        self
    }

    /// Sets the time offset used by the interpolation layout.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// Breakpoint levels.
    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Segment durations.
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    /// Curve of segment `i`, cycling through the curve list.
    pub fn curve(&self, i: usize) -> Curve {
        self.curves[i % self.curves.len()]
    }

    /// Release node, if any.
    pub fn release_node(&self) -> Option<usize> {
        self.release_node
    }

    /// Loop node, if any.
    pub fn loop_node(&self) -> Option<usize> {
        self.loop_node
    }

    /// Sum of all segment times.
    pub fn duration(&self) -> f32 {
        self.times.iter().sum()
    }

    fn node_marker(node: Option<usize>) -> f32 {
        node.map_or(NO_NODE, |n| n as f32)
    }

    /// Flat layout consumed by `EnvGen`.
    pub fn flatten(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(4 + 4 * self.times.len());
        out.extend([
            self.levels[0],
            self.times.len() as f32,
            Self::node_marker(self.release_node),
            Self::node_marker(self.loop_node),
        ]);
        for (i, &time) in self.times.iter().enumerate() {
            let curve = self.curve(i);
            out.extend([
                self.levels[i + 1],
                time,
                curve.shape_code() as f32,
                curve.value(),
            ]);
        }
        out
    }

    /// Flat layout consumed by `IEnvGen`.
    pub fn flatten_for_interpolation(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(4 + 4 * self.times.len());
        out.extend([
            self.offset,
            self.levels[0],
            self.times.len() as f32,
            self.duration(),
        ]);
        for (i, &time) in self.times.iter().enumerate() {
            let curve = self.curve(i);
            out.extend([
                time,
                curve.shape_code() as f32,
                curve.value(),
                self.levels[i + 1],
            ]);
        }
        out
    }

    /// The `flatten` layout as an array of literal inputs.
    pub fn to_signal(&self) -> Signal {
        Signal::array(self.flatten())
    }

    /// Attack, decay, sustain until released, then release.
    pub fn adsr(opts: &Adsr) -> Self {
        let levels = [0.0, opts.peak, opts.peak * opts.sustain, 0.0]
            .iter()
            .map(|l| l + opts.bias)
            .collect();
        Self::shaped(levels, vec![opts.attack, opts.decay, opts.release], opts.curve)
            .with_release_node(2)
    }

    /// Attack, sustain until released, then release.
    pub fn asr(opts: &Asr) -> Self {
        Self::shaped(
            vec![0.0, opts.sustain, 0.0],
            vec![opts.attack, opts.release],
            opts.curve,
        )
        .with_release_node(1)
    }

    /// Fixed-length attack and release.
    pub fn perc(opts: &Perc) -> Self {
        Self::shaped(
            vec![0.0, opts.level, 0.0],
            vec![opts.attack, opts.release],
            opts.curve,
        )
    }

    /// Trapezoid: attack, fixed sustain, release.
    pub fn linen(opts: &Linen) -> Self {
        Self::shaped(
            vec![0.0, opts.level, opts.level, 0.0],
            vec![opts.attack, opts.sustain, opts.release],
            opts.curve,
        )
    }

    /// Linear rise and fall over `duration`.
    pub fn triangle(duration: f32, level: f32) -> Self {
        let half = duration / 2.0;
        Self::shaped(vec![0.0, level, 0.0], vec![half, half], Curve::Linear)
    }

    // Level/time lists built here always satisfy the length invariant.
    fn shaped(levels: Vec<f32>, times: Vec<f32>, curve: Curve) -> Self {
        Self {
            levels,
            times,
            curves: vec![curve],
            release_node: None,
            loop_node: None,
            offset: 0.0,
        }
    }
}

/// Options for [`Env::adsr`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adsr {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level as a fraction of `peak`.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
    /// Peak level.
    pub peak: f32,
    /// Curve of every segment.
    pub curve: Curve,
    /// Offset added to every level.
    pub bias: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.3,
            sustain: 0.5,
            release: 1.0,
            peak: 1.0,
            curve: Curve::Numeric(-4.0),
            bias: 0.0,
        }
    }
}

/// Options for [`Env::asr`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Asr {
    /// Attack time in seconds.
    pub attack: f32,
    /// Sustain level.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
    /// Curve of every segment.
    pub curve: Curve,
}

impl Default for Asr {
    fn default() -> Self {
        Self {
            attack: 0.01,
            sustain: 1.0,
            release: 1.0,
            curve: Curve::Numeric(-4.0),
        }
    }
}

/// Options for [`Env::perc`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perc {
    /// Attack time in seconds.
    pub attack: f32,
    /// Release time in seconds.
    pub release: f32,
    /// Peak level.
    pub level: f32,
    /// Curve of every segment.
    pub curve: Curve,
}

impl Default for Perc {
    fn default() -> Self {
        Self {
            attack: 0.01,
            release: 1.0,
            level: 1.0,
            curve: Curve::Numeric(-4.0),
        }
    }
}

/// Options for [`Env::linen`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Linen {
    /// Attack time in seconds.
    pub attack: f32,
    /// Sustain time in seconds.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
    /// Sustain level.
    pub level: f32,
    /// Curve of every segment.
    pub curve: Curve,
}

impl Default for Linen {
    fn default() -> Self {
        Self {
            attack: 0.01,
            sustain: 1.0,
            release: 1.0,
            level: 1.0,
            curve: Curve::Linear,
        }
    }
}
