//! Sample buffers: synth-local allocation, recording, and playback.

use synthdef_core::{Builder, NodeSpec, Rate, Result, Signal, SynthDefError, expand_with};

use crate::args::{ArgSpec, Outputs, UGen, UGenArgs, all_slots, check_rate};
use crate::error::UGenError;

/// A buffer owned by one synth and freed with it.
///
/// Each instance claims a slot from the build's local-buffer count and takes
/// the count node as its last input. Nodes created later are ordered after
/// it.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalBuf {
    /// Channels per frame. Default `1`.
    pub channels: Signal,
    /// Number of frames. Default `1`.
    pub frames: Signal,
}

impl Default for LocalBuf {
    fn default() -> Self {
        Self {
            channels: 1.0.into(),
            frames: 1.0.into(),
        }
    }
}

impl LocalBuf {
    /// A one-channel, one-frame buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `numChannels`.
    pub fn channels(mut self, value: impl Into<Signal>) -> Self {
        self.channels = value.into();
        self
    }

    /// Sets `numFrames`.
    pub fn frames(mut self, value: impl Into<Signal>) -> Self {
        self.frames = value.into();
        self
    }

    /// Creates the buffer.
    pub fn ir(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Scalar)
    }
}

impl UGen for LocalBuf {
    const NAME: &'static str = "LocalBuf";
    const RATES: &'static [Rate] = &[Rate::Scalar];
    const ARGS: &'static [ArgSpec] = &[ArgSpec::input("numChannels", 1.0), ArgSpec::input("numFrames", 1.0)];
    const OUTPUTS: Outputs = Outputs::Fixed(1);

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let mut ugen = Self::new();
        if let Some(v) = args.signal(Self::NAME, "numChannels")? {
            ugen.channels = v;
        }
        if let Some(v) = args.signal(Self::NAME, "numFrames")? {
            ugen.frames = v;
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let spec = NodeSpec::new(Self::NAME, rate).width_first();
        expand_with(Self::NAME, &[self.channels, self.frames], &[0, 1], |mut inputs| {
            let token = builder.allocate_local_buffer()?;
            inputs.push(token.counter().into());
            builder.create(&spec, inputs)
        })
    }
}

/// Records channels into a buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordBuf {
    /// One signal per buffer channel.
    pub input: Signal,
    /// Buffer to write. Default `0`.
    pub bufnum: Signal,
    /// Starting frame. Default `0`.
    pub offset: Signal,
    /// Gain of the new input. Default `1`.
    pub rec_level: Signal,
    /// Gain of the existing contents. Default `0`.
    pub pre_level: Signal,
    /// Records while positive. Default `1`.
    pub run: Signal,
    /// Wraps to the start when reaching the end. Default `1`.
    pub looping: Signal,
    /// Jumps to `offset` on a positive edge. Default `1`.
    pub trigger: Signal,
    /// Action when a non-looping recording ends. Default `0`.
    pub done_action: Signal,
}

impl RecordBuf {
    /// Records `input` into buffer 0.
    pub fn new(input: impl Into<Signal>) -> Self {
        Self {
            input: input.into(),
            bufnum: 0.0.into(),
            offset: 0.0.into(),
            rec_level: 1.0.into(),
            pre_level: 0.0.into(),
            run: 1.0.into(),
            looping: 1.0.into(),
            trigger: 1.0.into(),
            done_action: 0.0.into(),
        }
    }

    /// Sets `bufnum`.
    pub fn bufnum(mut self, value: impl Into<Signal>) -> Self {
        self.bufnum = value.into();
        self
    }

    /// Sets `offset`.
    pub fn offset(mut self, value: impl Into<Signal>) -> Self {
        self.offset = value.into();
        self
    }

    /// Sets `recLevel`.
    pub fn rec_level(mut self, value: impl Into<Signal>) -> Self {
        self.rec_level = value.into();
        self
    }

    /// Sets `preLevel`.
    pub fn pre_level(mut self, value: impl Into<Signal>) -> Self {
        self.pre_level = value.into();
        self
    }

    /// Sets `run`.
    pub fn run(mut self, value: impl Into<Signal>) -> Self {
        self.run = value.into();
        self
    }

    /// Sets `loop`.
    pub fn looping(mut self, value: impl Into<Signal>) -> Self {
        self.looping = value.into();
        self
    }

    /// Sets `trigger`.
    pub fn trigger(mut self, value: impl Into<Signal>) -> Self {
        self.trigger = value.into();
        self
    }

    /// Sets `doneAction`.
    pub fn done_action(mut self, value: impl Into<Signal>) -> Self {
        self.done_action = value.into();
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

impl UGen for RecordBuf {
    const NAME: &'static str = "RecordBuf";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[
        ArgSpec::channels("input"),
        ArgSpec::input("bufnum", 0.0),
        ArgSpec::input("offset", 0.0),
        ArgSpec::input("recLevel", 1.0),
        ArgSpec::input("preLevel", 0.0),
        ArgSpec::input("run", 1.0),
        ArgSpec::input("loop", 1.0),
        ArgSpec::input("trigger", 1.0),
        ArgSpec::input("doneAction", 0.0),
    ];
    const OUTPUTS: Outputs = Outputs::Fixed(1);

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let mut ugen = Self::new(args.required_signal(Self::NAME, "input")?);
        for (arg, field) in [
            ("bufnum", &mut ugen.bufnum),
            ("offset", &mut ugen.offset),
            ("recLevel", &mut ugen.rec_level),
            ("preLevel", &mut ugen.pre_level),
            ("run", &mut ugen.run),
            ("loop", &mut ugen.looping),
            ("trigger", &mut ugen.trigger),
            ("doneAction", &mut ugen.done_action),
        ] {
            if let Some(v) = args.signal(Self::NAME, arg)? {
                *field = v;
            }
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let mut args = vec![
            self.bufnum,
            self.offset,
            self.rec_level,
            self.pre_level,
            self.run,
            self.looping,
            self.trigger,
            self.done_action,
        ];
        if self.input.is_empty() {
            return Err(SynthDefError::EmptyExpansionArgument {
                type_tag: Self::NAME.to_string(),
                slot: args.len(),
            });
        }
        args.extend(self.input.into_channels());
        builder.expand(&NodeSpec::new(Self::NAME, rate), &args, &all_slots(args.len()))
    }
}

/// Plays a buffer back.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayBuf {
    /// Channels in the buffer, and outputs. Default `1`.
    pub channels: u32,
    /// Buffer to read. Default `0`.
    pub bufnum: Signal,
    /// Playback speed, 1 is the recorded speed. Default `1`.
    pub speed: Signal,
    /// Jumps to `start_pos` on a positive edge. Default `1`.
    pub trigger: Signal,
    /// First frame to play. Default `0`.
    pub start_pos: Signal,
    /// Wraps to the start when reaching the end. Default `0`.
    pub looping: Signal,
    /// Action when non-looping playback ends. Default `0`.
    pub done_action: Signal,
}

impl PlayBuf {
    /// Plays buffer `bufnum` with `channels` channels.
    pub fn new(channels: u32, bufnum: impl Into<Signal>) -> Self {
        Self {
            channels,
            bufnum: bufnum.into(),
            speed: 1.0.into(),
            trigger: 1.0.into(),
            start_pos: 0.0.into(),
            looping: 0.0.into(),
            done_action: 0.0.into(),
        }
    }

    /// Sets `rate`.
    pub fn speed(mut self, value: impl Into<Signal>) -> Self {
        self.speed = value.into();
        self
    }

    /// Sets `trigger`.
    pub fn trigger(mut self, value: impl Into<Signal>) -> Self {
        self.trigger = value.into();
        self
    }

    /// Sets `startPos`.
    pub fn start_pos(mut self, value: impl Into<Signal>) -> Self {
        self.start_pos = value.into();
        self
    }

    /// Sets `loop`.
    pub fn looping(mut self, value: impl Into<Signal>) -> Self {
        self.looping = value.into();
        self
    }

    /// Sets `doneAction`.
    pub fn done_action(mut self, value: impl Into<Signal>) -> Self {
        self.done_action = value.into();
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

impl UGen for PlayBuf {
    const NAME: &'static str = "PlayBuf";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[
        ArgSpec::count("numChannels", 1.0),
        ArgSpec::input("bufnum", 0.0),
        ArgSpec::input("rate", 1.0),
        ArgSpec::input("trigger", 1.0),
        ArgSpec::input("startPos", 0.0),
        ArgSpec::input("loop", 0.0),
        ArgSpec::input("doneAction", 0.0),
    ];
    const OUTPUTS: Outputs = Outputs::Channels;

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let channels = args.count(Self::NAME, "numChannels")?.unwrap_or(1);
        let mut ugen = Self::new(channels, 0.0);
        for (arg, field) in [
            ("bufnum", &mut ugen.bufnum),
            ("rate", &mut ugen.speed),
            ("trigger", &mut ugen.trigger),
            ("startPos", &mut ugen.start_pos),
            ("loop", &mut ugen.looping),
            ("doneAction", &mut ugen.done_action),
        ] {
            if let Some(v) = args.signal(Self::NAME, arg)? {
                *field = v;
            }
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let args = [
            self.bufnum,
            self.speed,
            self.trigger,
            self.start_pos,
            self.looping,
            self.done_action,
        ];
        let spec = NodeSpec::new(Self::NAME, rate).outputs(self.channels);
        builder.expand(&spec, &args, &all_slots(args.len()))
    }
}

ugen! {
    /// Number of frames in a buffer.
    BufFrames {
        outputs: 1,
        rates: [kr, ir],
        args: {
            /// Buffer to query.
            bufnum("bufnum") = 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthdef_core::{ActiveBuild, Input, MAX_LOCAL_BUFS};

    #[test]
    fn local_buf_claims_a_slot_and_follows_the_counter() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let buf = LocalBuf::new().frames(1024).ir(&mut b).unwrap();
        assert_eq!(b.local_buffer_count(), 1);
        assert_eq!(b.nodes()[0].type_tag(), MAX_LOCAL_BUFS);
        let node = &b.nodes()[1];
        assert_eq!(node.inputs()[..2], [Input::Constant(1.0), Input::Constant(1024.0)]);
        assert_eq!(node.inputs()[2].as_wire().map(|w| w.node()), Some(b.nodes()[0].id()));
        assert_eq!(buf.width(), 1);
    }

    #[test]
    fn expanded_local_bufs_each_claim_a_slot() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let bufs = LocalBuf::new().frames([256, 512]).ir(&mut b).unwrap();
        assert_eq!(bufs.width(), 2);
        assert_eq!(b.local_buffer_count(), 2);
        assert_eq!(b.node_count(), 3);
    }

    #[test]
    fn record_buf_puts_channels_last() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        RecordBuf::new([0.1, 0.2]).bufnum(3).ar(&mut b).unwrap();
        let inputs = b.nodes()[0].inputs();
        assert_eq!(inputs.len(), 10);
        assert_eq!(inputs[0], Input::Constant(3.0));
        assert_eq!(inputs[8..], [Input::Constant(0.1), Input::Constant(0.2)]);
    }

    #[test]
    fn play_buf_outputs_follow_channel_count() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let sig = PlayBuf::new(2, 0).looping(1).ar(&mut b).unwrap();
        assert_eq!(sig.width(), 2);
        assert_eq!(b.nodes()[0].inputs().len(), 6);
    }

    #[test]
    fn local_buf_only_runs_at_scalar_rate() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        assert!(LocalBuf::new().build(&mut b, Rate::Audio).is_err());
        assert_eq!(b.node_count(), 0);
    }
}
