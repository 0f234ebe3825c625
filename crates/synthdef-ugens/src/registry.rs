//! Name-indexed registry of the built-in unit generators.

use synthdef_core::{Builder, Rate, Signal};

use crate::args::{ArgSpec, Outputs, UGen, UGenArgs};
use crate::buffer::{BufFrames, LocalBuf, PlayBuf, RecordBuf};
use crate::demand::{Demand, Dseq, Dseries, Dwhite};
use crate::envelope::{EnvGen, IEnvGen, Line, XLine};
use crate::error::UGenError;
use crate::filter::{BPF, Decay, HPF, LPF, Lag, RHPF, RLPF};
use crate::info::{ControlRate, SampleRate};
use crate::io::{In, LocalIn, LocalOut, Out, ReplaceOut};
use crate::noise::{Dust, LFNoise0, LFNoise1, PinkNoise, WhiteNoise};
use crate::osc::{Blip, Impulse, LFPulse, LFSaw, LFTri, Pulse, Saw, SinOsc};
use crate::pan::{Balance2, Pan2};
use crate::trigger::{Latch, Poll, SendTrig, Trig};

/// Category of unit generator for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UGenCategory {
    /// Periodic oscillators
    Oscillator,
    /// Noise and random sources
    Noise,
    /// Filters and smoothing
    Filter,
    /// Stereo placement
    Pan,
    /// Envelopes and ramps
    Envelope,
    /// Triggers and reporting
    Trigger,
    /// Bus and feedback I/O
    Bus,
    /// Buffer allocation, recording, and playback
    Buffer,
    /// Demand-rate sequencing
    Demand,
    /// Engine information
    Info,
}

impl UGenCategory {
    /// Every category, in listing order.
    pub const ALL: &'static [UGenCategory] = &[
        UGenCategory::Oscillator,
        UGenCategory::Noise,
        UGenCategory::Filter,
        UGenCategory::Pan,
        UGenCategory::Envelope,
        UGenCategory::Trigger,
        UGenCategory::Bus,
        UGenCategory::Buffer,
        UGenCategory::Demand,
        UGenCategory::Info,
    ];

    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            UGenCategory::Oscillator => "Oscillator",
            UGenCategory::Noise => "Noise",
            UGenCategory::Filter => "Filter",
            UGenCategory::Pan => "Pan",
            UGenCategory::Envelope => "Envelope",
            UGenCategory::Trigger => "Trigger",
            UGenCategory::Bus => "Bus",
            UGenCategory::Buffer => "Buffer",
            UGenCategory::Demand => "Demand",
            UGenCategory::Info => "Info",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            UGenCategory::Oscillator => "Sine, sawtooth, pulse, and impulse oscillators",
            UGenCategory::Noise => "White, pink, and interpolated random sources",
            UGenCategory::Filter => "Lowpass, highpass, bandpass, and lag filters",
            UGenCategory::Pan => "Panners and balance controls",
            UGenCategory::Envelope => "Envelope generators and line segments",
            UGenCategory::Trigger => "Trigger shaping, sample and hold, and console output",
            UGenCategory::Bus => "Bus reads and writes and in-synth feedback",
            UGenCategory::Buffer => "Synth-local buffers, recording, and playback",
            UGenCategory::Demand => "Demand-rate sequences and the nodes that pull them",
            UGenCategory::Info => "Sample rate and other engine constants",
        }
    }
}

/// Describes a unit generator in the registry.
#[derive(Debug, Clone)]
pub struct UGenDescriptor {
    /// Type tag, also the lookup name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Category for organization.
    pub category: UGenCategory,
    /// Supported rates. The first is the default.
    pub rates: &'static [Rate],
    /// Named arguments with defaults.
    pub args: &'static [ArgSpec],
    /// Output count.
    pub outputs: Outputs,
}

impl UGenDescriptor {
    /// Rate used when a definition does not name one.
    pub fn default_rate(&self) -> Rate {
        self.rates.first().copied().unwrap_or(Rate::Audio)
    }

    /// Whether the node runs at `rate`.
    pub fn supports(&self, rate: Rate) -> bool {
        self.rates.contains(&rate)
    }

    /// Looks up an argument by name.
    pub fn arg(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|a| a.name == name)
    }

    /// Names of the arguments whose arrays expand the node.
    pub fn expandable(&self) -> impl Iterator<Item = &'static str> {
        self.args.iter().filter(|a| a.kind.expands()).map(|a| a.name)
    }
}

/// Factory function type for creating unit generators.
type UGenFactory = fn(&mut Builder, Rate, &UGenArgs) -> Result<Signal, UGenError>;

fn factory<U: UGen>(builder: &mut Builder, rate: Rate, args: &UGenArgs) -> Result<Signal, UGenError> {
    Ok(U::from_args(args)?.build(builder, rate)?)
}

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: UGenDescriptor,
    factory: UGenFactory,
}

/// Registry of all built-in unit generators.
///
/// Definition files and the command-line tool create nodes through the
/// registry by name.
pub struct UGenRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for UGenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UGenRegistry {
    /// Create a new registry with all built-in unit generators registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(48),
        };
        registry.register_builtin_ugens();
        registry
    }

    /// Register all built-in unit generators.
    fn register_builtin_ugens(&mut self) {
        // Oscillators
        self.register::<SinOsc>(UGenCategory::Oscillator, "Sine oscillator");
        self.register::<Saw>(UGenCategory::Oscillator, "Band-limited sawtooth");
        self.register::<Pulse>(UGenCategory::Oscillator, "Band-limited pulse wave");
        self.register::<Blip>(UGenCategory::Oscillator, "Band-limited impulse train");
        self.register::<LFSaw>(UGenCategory::Oscillator, "Non-band-limited sawtooth");
        self.register::<LFPulse>(UGenCategory::Oscillator, "Non-band-limited pulse wave");
        self.register::<LFTri>(UGenCategory::Oscillator, "Non-band-limited triangle wave");
        self.register::<Impulse>(UGenCategory::Oscillator, "Single-sample impulses");

        // Noise
        self.register::<WhiteNoise>(UGenCategory::Noise, "Uniform white noise");
        self.register::<PinkNoise>(UGenCategory::Noise, "Pink noise");
        self.register::<Dust>(UGenCategory::Noise, "Random impulses");
        self.register::<LFNoise0>(UGenCategory::Noise, "Step noise");
        self.register::<LFNoise1>(UGenCategory::Noise, "Ramp noise");

        // Filters
        self.register::<LPF>(UGenCategory::Filter, "Butterworth lowpass");
        self.register::<HPF>(UGenCategory::Filter, "Butterworth highpass");
        self.register::<BPF>(UGenCategory::Filter, "Butterworth bandpass");
        self.register::<RLPF>(UGenCategory::Filter, "Resonant lowpass");
        self.register::<RHPF>(UGenCategory::Filter, "Resonant highpass");
        self.register::<Lag>(UGenCategory::Filter, "Exponential lag");
        self.register::<Decay>(UGenCategory::Filter, "Exponential decay of impulses");

        // Panning
        self.register::<Pan2>(UGenCategory::Pan, "Equal-power stereo panner");
        self.register::<Balance2>(UGenCategory::Pan, "Stereo balance");

        // Envelopes
        self.register::<EnvGen>(UGenCategory::Envelope, "Gated envelope generator");
        self.register::<IEnvGen>(UGenCategory::Envelope, "Envelope read at an index");
        self.register::<Line>(UGenCategory::Envelope, "Linear ramp");
        self.register::<XLine>(UGenCategory::Envelope, "Exponential ramp");

        // Triggers
        self.register::<Trig>(UGenCategory::Trigger, "Timed trigger hold");
        self.register::<Latch>(UGenCategory::Trigger, "Sample and hold");
        self.register::<SendTrig>(UGenCategory::Trigger, "Trigger message to clients");
        self.register::<Poll>(UGenCategory::Trigger, "Prints a value on each trigger");

        // Bus I/O
        self.register::<Out>(UGenCategory::Bus, "Mixes channels onto buses");
        self.register::<ReplaceOut>(UGenCategory::Bus, "Overwrites buses");
        self.register::<In>(UGenCategory::Bus, "Reads buses");
        self.register::<LocalIn>(UGenCategory::Bus, "Reads in-synth feedback");
        self.register::<LocalOut>(UGenCategory::Bus, "Writes in-synth feedback");

        // Buffers
        self.register::<LocalBuf>(UGenCategory::Buffer, "Synth-local buffer");
        self.register::<RecordBuf>(UGenCategory::Buffer, "Records into a buffer");
        self.register::<PlayBuf>(UGenCategory::Buffer, "Plays a buffer");
        self.register::<BufFrames>(UGenCategory::Buffer, "Frame count of a buffer");

        // Demand
        self.register::<Dseq>(UGenCategory::Demand, "Sequence of values");
        self.register::<Dwhite>(UGenCategory::Demand, "Random values");
        self.register::<Dseries>(UGenCategory::Demand, "Arithmetic series");
        self.register::<Demand>(UGenCategory::Demand, "Pulls demand sources on trigger");

        // Info
        self.register::<SampleRate>(UGenCategory::Info, "Engine sample rate");
        self.register::<ControlRate>(UGenCategory::Info, "Engine control rate");
    }

    /// Register a unit generator type.
    fn register<U: UGen>(&mut self, category: UGenCategory, description: &'static str) {
        self.entries.push(RegistryEntry {
            descriptor: UGenDescriptor {
                name: U::NAME,
                description,
                category,
                rates: U::RATES,
                args: U::ARGS,
                outputs: U::OUTPUTS,
            },
            factory: factory::<U>,
        });
    }

    /// Get all registered unit generators.
    pub fn all_ugens(&self) -> Vec<&UGenDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Get unit generators in a specific category.
    pub fn ugens_in_category(&self, category: UGenCategory) -> Vec<&UGenDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&UGenDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.name == name)
            .map(|e| &e.descriptor)
    }

    /// Create a unit generator by name at `rate`.
    ///
    /// Omitted arguments take their defaults.
    pub fn create(
        &self,
        builder: &mut Builder,
        name: &str,
        rate: Rate,
        args: &UGenArgs,
    ) -> Result<Signal, UGenError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.name == name)
            .ok_or_else(|| UGenError::UnknownUGen(name.to_string()))?;

        #[cfg(feature = "tracing")]
        tracing::debug!("registry_create: {} {} ({} args)", name, rate, args.len());

        (entry.factory)(builder, rate, args)
    }

    /// Number of registered unit generators.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no unit generators are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthdef_core::{ActiveBuild, Adsr, Env, SynthDefError};

    #[test]
    fn test_registry_creation() {
        let registry = UGenRegistry::new();
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), registry.all_ugens().len());
    }

    #[test]
    fn test_names_are_unique() {
        let registry = UGenRegistry::new();
        let mut names: Vec<_> = registry.all_ugens().iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), registry.len());
    }

    #[test]
    fn test_get_ugen() {
        let registry = UGenRegistry::new();
        let sine = registry.get("SinOsc").unwrap();
        assert_eq!(sine.category, UGenCategory::Oscillator);
        assert_eq!(sine.default_rate(), Rate::Audio);
        assert_eq!(sine.arg("freq").and_then(|a| a.default), Some(440.0));
        assert!(registry.get("sinosc").is_none());
    }

    #[test]
    fn test_create_ugen() {
        let registry = UGenRegistry::new();
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let sig = registry
            .create(&mut b, "Pan2", Rate::Audio, &UGenArgs::new().with("pos", -0.5))
            .unwrap();
        assert_eq!(sig.width(), 2);
        assert_eq!(b.nodes()[0].type_tag(), "Pan2");
    }

    #[test]
    fn test_create_envelope() {
        let registry = UGenRegistry::new();
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let args = UGenArgs::new()
            .with("envelope", Env::adsr(&Adsr::default()))
            .with("doneAction", 2);
        registry.create(&mut b, "EnvGen", Rate::Control, &args).unwrap();
        assert_eq!(b.nodes()[0].inputs().len(), 21);
    }

    #[test]
    fn test_create_errors() {
        let registry = UGenRegistry::new();
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        assert!(matches!(
            registry.create(&mut b, "Nope", Rate::Audio, &UGenArgs::new()),
            Err(UGenError::UnknownUGen(_))
        ));
        assert!(matches!(
            registry.create(&mut b, "SinOsc", Rate::Audio, &UGenArgs::new().with("frequency", 1)),
            Err(UGenError::UnknownArgument { .. })
        ));
        assert!(matches!(
            registry.create(&mut b, "Dseq", Rate::Audio, &UGenArgs::new().with("list", 1)),
            Err(UGenError::SynthDef(SynthDefError::UnsupportedRate { .. }))
        ));
    }

    #[test]
    fn test_ugens_by_category() {
        let registry = UGenRegistry::new();
        let demand = registry.ugens_in_category(UGenCategory::Demand);
        assert!(demand.iter().any(|d| d.name == "Dseq"));
        assert!(demand.iter().all(|d| d.category == UGenCategory::Demand));
    }

    #[test]
    fn test_category_names() {
        assert_eq!(UGenCategory::Oscillator.name(), "Oscillator");
        assert!(!UGenCategory::Buffer.description().is_empty());
    }

    #[test]
    fn test_every_category_is_populated() {
        let registry = UGenRegistry::new();
        let total: usize = UGenCategory::ALL
            .iter()
            .map(|c| registry.ugens_in_category(*c).len())
            .inspect(|n| assert!(*n > 0))
            .sum();
        assert_eq!(total, registry.len());
    }

    #[test]
    fn test_expandable_excludes_envelope_and_counts() {
        let registry = UGenRegistry::new();
        let envgen: Vec<_> = registry.get("EnvGen").unwrap().expandable().collect();
        assert!(!envgen.contains(&"envelope"));
        assert!(envgen.contains(&"gate"));
        let input: Vec<_> = registry.get("In").unwrap().expandable().collect();
        assert_eq!(input, vec!["bus"]);
    }

    #[test]
    fn test_every_ugen_has_a_rate() {
        let registry = UGenRegistry::new();
        for d in registry.all_ugens() {
            assert!(!d.rates.is_empty(), "{} has no rates", d.name);
            assert!(d.supports(d.default_rate()));
        }
    }
}
