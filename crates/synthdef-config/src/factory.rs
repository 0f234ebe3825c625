//! Factory definitions bundled with the library.
//!
//! Each one is a small complete definition that exercises a different part
//! of the compiler: parameters, multichannel outputs, envelopes, local
//! buffers and feedback, and demand-rate sequencing.

use crate::DefinitionFile;

/// Names of the factory definitions.
pub static FACTORY_DEFINITION_NAMES: &[&str] = &["sine", "param_sine", "pan", "gated", "feedback", "demand_poll"];

/// TOML content for factory definitions, embedded at compile time.
static FACTORY_DEFINITIONS_TOML: &[(&str, &str)] = &[
    ("sine", SINE),
    ("param_sine", PARAM_SINE),
    ("pan", PAN),
    ("gated", GATED),
    ("feedback", FEEDBACK),
    ("demand_poll", DEMAND_POLL),
];

const SINE: &str = r#"
name = "sine"
description = "Fixed 440 Hz sine at 0.2 amplitude on bus 0"

[[nodes]]
id = "osc"
ugen = "SinOsc"
rate = "audio"
args = { freq = 440, mul = 0.2 }

[[nodes]]
ugen = "Out"
rate = "audio"
args = { bus = 0, channels = "osc" }
"#;

const PARAM_SINE: &str = r#"
name = "param_sine"
description = "Sine with frequency and amplitude controls"

[[params]]
name = "freq"
default = 440.0

[[params]]
name = "amp"
default = 0.1

[[nodes]]
id = "osc"
ugen = "SinOsc"
rate = "audio"
args = { freq = "freq", mul = "amp" }

[[nodes]]
ugen = "Out"
rate = "audio"
args = { bus = 0, channels = "osc" }
"#;

const PAN: &str = r#"
name = "pan"
description = "Sine panned across two channels"

[[params]]
name = "pos"
default = 0.0

[[nodes]]
id = "osc"
ugen = "SinOsc"
rate = "audio"

[[nodes]]
id = "stereo"
ugen = "Pan2"
rate = "audio"
args = { in = "osc", pos = "pos" }

[[nodes]]
ugen = "Out"
rate = "audio"
args = { bus = 0, channels = "stereo" }
"#;

const GATED: &str = r#"
name = "gated"
description = "Sine shaped by an ADSR envelope that frees the synth on release"

[[params]]
name = "gate"
default = 1.0

[[params]]
name = "freq"
default = 440.0

[[nodes]]
id = "env"
ugen = "EnvGen"
rate = "control"
args = { envelope = { shape = "adsr" }, gate = "gate", doneAction = 2 }

[[nodes]]
id = "osc"
ugen = "SinOsc"
rate = "audio"
args = { freq = "freq" }

[[nodes]]
id = "sig"
op = "mul"
args = { a = "osc", b = "env" }

[[nodes]]
ugen = "Out"
rate = "audio"
args = { bus = 0, channels = "sig" }
"#;

const FEEDBACK: &str = r#"
name = "feedback"
description = "Sine mixed with its own feedback and recorded into a local buffer"

[[nodes]]
id = "buf"
ugen = "LocalBuf"
rate = "scalar"
args = { numFrames = 1024 }

[[nodes]]
id = "fb"
ugen = "LocalIn"
rate = "audio"

[[nodes]]
id = "osc"
ugen = "SinOsc"
rate = "audio"
args = { freq = 220 }

[[nodes]]
id = "sum"
op = "+"
args = { a = "osc", b = "fb" }

[[nodes]]
id = "sig"
op = "*"
args = { a = "sum", b = 0.5 }

[[nodes]]
ugen = "LocalOut"
rate = "audio"
args = { channels = "sig" }

[[nodes]]
ugen = "RecordBuf"
rate = "audio"
args = { input = "sig", bufnum = "buf" }

[[nodes]]
ugen = "Out"
rate = "audio"
args = { bus = 0, channels = "sig" }
"#;

const DEMAND_POLL: &str = r#"
name = "demand_poll"
description = "Steps through a note sequence four times a second and prints it"

[[nodes]]
id = "trig"
ugen = "Impulse"
rate = "control"
args = { freq = 4 }

[[nodes]]
id = "seq"
ugen = "Dseq"
rate = "demand"
args = { list = [60, 62, 64], repeats = inf }

[[nodes]]
id = "note"
ugen = "Demand"
rate = "control"
args = { trig = "trig", demandUGens = "seq" }

[[nodes]]
ugen = "Poll"
rate = "control"
args = { trig = "trig", in = "note", label = "note" }
"#;

/// All factory definitions.
pub fn factory_definitions() -> Vec<DefinitionFile> {
    FACTORY_DEFINITIONS_TOML
        .iter()
        .filter_map(|(_, toml)| DefinitionFile::from_toml(toml).ok())
        .collect()
}

/// Get a factory definition by name, ignoring case.
///
/// # Example
///
/// ```rust
/// use synthdef_config::get_factory_definition;
///
/// let def = get_factory_definition("gated").unwrap();
/// assert_eq!(def.params.len(), 2);
/// ```
pub fn get_factory_definition(name: &str) -> Option<DefinitionFile> {
    FACTORY_DEFINITIONS_TOML
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| DefinitionFile::from_toml(toml).ok())
}

/// Names of all factory definitions.
pub fn factory_definition_names() -> Vec<&'static str> {
    FACTORY_DEFINITIONS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name is a factory definition, ignoring case.
pub fn is_factory_definition(name: &str) -> bool {
    FACTORY_DEFINITION_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
}
