//! Bus input and output, and the local feedback pair.

use synthdef_core::{Builder, Input, Node, NodeId, NodeSpec, Rate, Result, Signal, SynthDefError};

use crate::args::{ArgKind, ArgSpec, Outputs, UGen, UGenArgs, all_slots, check_rate};
use crate::error::UGenError;

/// Shared body of the bus writers: the bus index, then one input per channel.
fn write_channels(
    builder: &mut Builder,
    type_tag: &'static str,
    rate: Rate,
    leading: Vec<Signal>,
    channels: Signal,
) -> Result<Signal> {
    if channels.is_empty() {
        return Err(SynthDefError::EmptyExpansionArgument {
            type_tag: type_tag.to_string(),
            slot: leading.len(),
        });
    }
    let mut args = leading;
    args.extend(channels.into_channels());
    let spec = NodeSpec::new(type_tag, rate).outputs(0);
    builder.expand(&spec, &args, &all_slots(args.len()))
}

macro_rules! bus_writer {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            /// First bus to write. Default `0`.
            pub bus: Signal,
            /// One signal per consecutive bus.
            pub channels: Signal,
        }

        impl $name {
            /// Writes `channels` starting at `bus`.
            pub fn new(bus: impl Into<Signal>, channels: impl Into<Signal>) -> Self {
                Self {
                    bus: bus.into(),
                    channels: channels.into(),
                }
            }

            /// Creates the node at audio rate.
            pub fn ar(self, builder: &mut Builder) -> Result<Signal> {
                self.build(builder, Rate::Audio)
            }

            /// Creates the node at control rate.
            pub fn kr(self, builder: &mut Builder) -> Result<Signal> {
                self.build(builder, Rate::Control)
            }
        }

        impl UGen for $name {
            const NAME: &'static str = stringify!($name);
            const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
            const ARGS: &'static [ArgSpec] = &[ArgSpec::input("bus", 0.0), ArgSpec::channels("channels")];
            const OUTPUTS: Outputs = Outputs::Fixed(0);

            fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
                args.check(Self::NAME, Self::ARGS)?;
                Ok(Self::new(
                    args.signal(Self::NAME, "bus")?.unwrap_or_else(|| Signal::from(0.0)),
                    args.required_signal(Self::NAME, "channels")?,
                ))
            }

            fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
                check_rate::<Self>(rate)?;
                write_channels(builder, Self::NAME, rate, vec![self.bus], self.channels)
            }
        }
    };
}

bus_writer! {
    /// Adds channels to consecutive buses.
    Out
}

bus_writer! {
    /// Overwrites consecutive buses with channels.
    ReplaceOut
}

/// Reads consecutive buses.
#[derive(Clone, Debug, PartialEq)]
pub struct In {
    /// First bus to read. Default `0`.
    pub bus: Signal,
    /// Number of buses, and outputs. Default `1`.
    pub channels: u32,
}

impl In {
    /// Reads `channels` buses starting at `bus`.
    pub fn new(bus: impl Into<Signal>, channels: u32) -> Self {
        Self {
            bus: bus.into(),
            channels,
        }
    }

    /// Creates the node at audio rate.
    pub fn ar(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Audio)
    }

    /// Creates the node at control rate.
    pub fn kr(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Control)
    }
}

impl UGen for In {
    const NAME: &'static str = "In";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[ArgSpec::input("bus", 0.0), ArgSpec::count("numChannels", 1.0)];
    const OUTPUTS: Outputs = Outputs::Channels;

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        Ok(Self::new(
            args.signal(Self::NAME, "bus")?.unwrap_or_else(|| Signal::from(0.0)),
            args.count(Self::NAME, "numChannels")?.unwrap_or(1),
        ))
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let spec = NodeSpec::new(Self::NAME, rate).outputs(self.channels);
        builder.expand(&spec, &[self.bus], &[0])
    }
}

/// Reads the feedback written by [`LocalOut`] during the previous block.
///
/// Each channel's initial value comes from `default`, which wraps around
/// when shorter than the channel count.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalIn {
    /// Number of channels, and outputs. Default `1`.
    pub channels: u32,
    /// Initial value per channel. Default `0`.
    pub default: Signal,
}

impl Default for LocalIn {
    fn default() -> Self {
        Self::new(1)
    }
}

impl LocalIn {
    /// Reads `channels` channels starting from zero.
    pub fn new(channels: u32) -> Self {
        Self {
            channels,
            default: 0.0.into(),
        }
    }

    /// Sets the initial values.
    pub fn default_values(mut self, value: impl Into<Signal>) -> Self {
        self.default = value.into();
        self
    }

    /// Creates the node at audio rate.
    pub fn ar(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Audio)
    }

    /// Creates the node at control rate.
    pub fn kr(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Control)
    }
}

impl UGen for LocalIn {
    const NAME: &'static str = "LocalIn";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[
        ArgSpec::count("numChannels", 1.0),
        ArgSpec {
            name: "default",
            kind: ArgKind::Channels,
            default: Some(0.0),
        },
    ];
    const OUTPUTS: Outputs = Outputs::Channels;

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let mut ugen = Self::new(args.count(Self::NAME, "numChannels")?.unwrap_or(1));
        if let Some(v) = args.signal(Self::NAME, "default")? {
            ugen.default = v;
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let values = self.default.flatten();
        let fill = if values.is_empty() { vec![Input::Constant(0.0)] } else { values };
        let inputs = fill
            .into_iter()
            .cycle()
            .zip(0..self.channels)
            .map(|(input, _)| input)
            .collect();
        builder.create(&NodeSpec::new(Self::NAME, rate).outputs(self.channels), inputs)
    }
}

/// Writes feedback for [`LocalIn`] to read in the next block.
///
/// Each writer is ordered after every `LocalIn` of the same rate created
/// before it, so a read and a write in one block never swap.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalOut {
    /// One signal per feedback channel.
    pub channels: Signal,
}

impl LocalOut {
    /// Writes `channels`.
    pub fn new(channels: impl Into<Signal>) -> Self {
        Self {
            channels: channels.into(),
        }
    }

    /// Creates the node at audio rate.
    pub fn ar(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Audio)
    }

    /// Creates the node at control rate.
    pub fn kr(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Control)
    }
}

impl UGen for LocalOut {
    const NAME: &'static str = "LocalOut";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[ArgSpec::channels("channels")];
    const OUTPUTS: Outputs = Outputs::Fixed(0);

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        Ok(Self::new(args.required_signal(Self::NAME, "channels")?))
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let first = builder.node_count();
        write_channels(builder, Self::NAME, rate, Vec::new(), self.channels)?;

        let readers: Vec<NodeId> = builder.nodes()[..first]
            .iter()
            .filter(|n| n.type_tag() == LocalIn::NAME && n.rate() == rate)
            .map(Node::id)
            .collect();
        let writers: Vec<NodeId> = builder.nodes()[first..].iter().map(Node::id).collect();
        for &writer in &writers {
            for &reader in &readers {
                builder.order_after(writer, reader)?;
            }
        }
        Ok(Signal::empty())
    }
}
