//! Binary encoder for the `SCgf` synth definition format, version 2.
//!
//! All multi-byte values are big-endian. Layout of a file:
//!
//! ```text
//! "SCgf" | int32 version | int16 definition count | definitions...
//! ```
//!
//! and of one definition:
//!
//! ```text
//! pstring name
//! int32 K, float32 * K                  constant pool
//! int32 P, float32 * P                  parameter defaults
//! int32 N, (pstring, int32) * N         parameter names
//! int32 U, ugen * U
//! int16 V, (pstring, float32 * P) * V   variants
//! ```
//!
//! Each ugen is `pstring type, int8 rate, int32 inputs, int32 outputs,
//! int16 special index`, then `(int32 ugen, int32 output)` per input with
//! `-1` as the ugen of a constant (whose index takes the output position),
//! then `int8 rate` per output.
//!
//! A value that does not fit its field is an
//! [`EncodingOverflow`](SynthDefError::EncodingOverflow), never truncated.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Result, SynthDefError};
use crate::synthdef::{InputSpec, SynthDef};

/// File magic.
pub const MAGIC: &[u8; 4] = b"SCgf";

/// Format version written by this encoder.
pub const FORMAT_VERSION: i32 = 2;

/// Longest string a `pstring` can hold.
pub const MAX_PSTRING: usize = 255;

fn write_pstring<W: Write>(w: &mut W, field: &'static str, s: &str) -> Result<()> {
    let len = u8::try_from(s.len()).map_err(|_| SynthDefError::overflow(field, s.len(), MAX_PSTRING as i64))?;
    w.write_u8(len)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn count_i32(field: &'static str, n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| SynthDefError::overflow(field, n, i64::from(i32::MAX)))
}

fn count_i16(field: &'static str, n: usize) -> Result<i16> {
    i16::try_from(n).map_err(|_| SynthDefError::overflow(field, n, i64::from(i16::MAX)))
}

fn index_i32(field: &'static str, n: u32) -> Result<i32> {
    count_i32(field, n as usize)
}

/// Writes a complete file holding `defs`.
pub fn write_file<W: Write>(w: &mut W, defs: &[SynthDef]) -> Result<()> {
    w.write_all(MAGIC)?;
    w.write_i32::<BigEndian>(FORMAT_VERSION)?;
    w.write_i16::<BigEndian>(count_i16("definition count", defs.len())?)?;
    for def in defs {
        def.write_to(w)?;
    }
    Ok(())
}

/// Encodes `defs` as one file.
pub fn encode_file(defs: &[SynthDef]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_file(&mut out, defs)?;

    #[cfg(feature = "tracing")]
    tracing::debug!("encode: {} definition(s), {} bytes", defs.len(), out.len());

    Ok(out)
}

impl SynthDef {
    /// Encodes this definition as a one-definition file.
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_file(std::slice::from_ref(self))
    }

    /// Writes this definition's body, without the file header.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_pstring(w, "definition name length", &self.name)?;

        w.write_i32::<BigEndian>(count_i32("constant count", self.constants.len())?)?;
        for &c in &self.constants {
            w.write_f32::<BigEndian>(c)?;
        }

        let param_count = self.params.values.len();
        w.write_i32::<BigEndian>(count_i32("parameter count", param_count)?)?;
        for &v in &self.params.values {
            w.write_f32::<BigEndian>(v)?;
        }

        w.write_i32::<BigEndian>(count_i32("parameter name count", self.params.names.len())?)?;
        for entry in &self.params.names {
            write_pstring(w, "parameter name length", &entry.name)?;
            w.write_i32::<BigEndian>(index_i32("parameter index", entry.index)?)?;
        }

        w.write_i32::<BigEndian>(count_i32("ugen count", self.ugens.len())?)?;
        for ugen in &self.ugens {
            write_pstring(w, "ugen name length", &ugen.type_tag)?;
            w.write_i8(ugen.rate.code() as i8)?;
            w.write_i32::<BigEndian>(count_i32("ugen input count", ugen.inputs.len())?)?;
            w.write_i32::<BigEndian>(count_i32("ugen output count", ugen.output_rates.len())?)?;
            let special = i16::try_from(ugen.special_index).map_err(|_| SynthDefError::EncodingOverflow {
                field: "special index",
                value: i64::from(ugen.special_index),
                max: i64::from(i16::MAX),
            })?;
            w.write_i16::<BigEndian>(special)?;
            for input in &ugen.inputs {
                let (source, slot) = match *input {
                    InputSpec::Constant(index) => (-1, index_i32("constant index", index)?),
                    InputSpec::Wire { ugen, output } => {
                        (index_i32("ugen index", ugen)?, index_i32("output index", output)?)
                    }
                };
                w.write_i32::<BigEndian>(source)?;
                w.write_i32::<BigEndian>(slot)?;
            }
            for rate in &ugen.output_rates {
                w.write_i8(rate.code() as i8)?;
            }
        }

        w.write_i16::<BigEndian>(count_i16("variant count", self.variants.len())?)?;
        for variant in &self.variants {
            write_pstring(w, "variant name length", &variant.name)?;
            if variant.values.len() != param_count {
                return Err(SynthDefError::invalid_param(
                    &variant.name,
                    format!(
                        "variant has {} values for {} parameters",
                        variant.values.len(),
                        param_count
                    ),
                ));
            }
            for &v in &variant.values {
                w.write_f32::<BigEndian>(v)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamTable;
    use crate::rate::Rate;
    use crate::synthdef::{UGenSpec, Variant};

    fn empty(name: &str) -> SynthDef {
        SynthDef {
            name: name.to_string(),
            constants: Vec::new(),
            params: ParamTable::default(),
            ugens: Vec::new(),
            variants: Vec::new(),
        }
    }

    #[test]
    fn header_and_empty_definition() {
        let bytes = empty("x").encode().unwrap();
        let mut expected = b"SCgf".to_vec();
        expected.extend([0, 0, 0, 2, 0, 1]);
        expected.extend([1, b'x']);
        expected.extend([0, 0, 0, 0]); // constants
        expected.extend([0, 0, 0, 0]); // params
        expected.extend([0, 0, 0, 0]); // names
        expected.extend([0, 0, 0, 0]); // ugens
        expected.extend([0, 0]); // variants
        assert_eq!(bytes, expected);
    }

    #[test]
    fn ugen_layout() {
        let mut def = empty("u");
        def.constants = vec![1.0];
        def.ugens = vec![
            UGenSpec {
                type_tag: "A".to_string(),
                rate: Rate::Audio,
                special_index: 0,
                inputs: vec![InputSpec::Constant(0)],
                output_rates: vec![Rate::Audio],
            },
            UGenSpec {
                type_tag: "B".to_string(),
                rate: Rate::Control,
                special_index: 2,
                inputs: vec![InputSpec::Wire { ugen: 0, output: 0 }],
                output_rates: vec![],
            },
        ];
        let bytes = def.encode().unwrap();
        let body = &bytes[10..];
        let ugens_at = 2 + 4 + 4 + 4 + 4;
        assert_eq!(&body[ugens_at..ugens_at + 4], &[0, 0, 0, 2]);
        let first = &body[ugens_at + 4..];
        assert_eq!(
            &first[..24],
            &[
                1, b'A', 2, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, //
                0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0, //
                2, //
                1, b'B',
            ]
        );
    }

    #[test]
    fn long_names_overflow() {
        let def = empty(&"n".repeat(256));
        match def.encode() {
            Err(SynthDefError::EncodingOverflow { field, value, max }) => {
                assert_eq!(field, "definition name length");
                assert_eq!((value, max), (256, 255));
            }
            other => panic!("expected overflow, got {other:?}"),
        }
        assert!(empty(&"n".repeat(255)).encode().is_ok());
    }

    #[test]
    fn special_index_must_fit_int16() {
        let mut def = empty("s");
        def.ugens.push(UGenSpec {
            type_tag: "Control".to_string(),
            rate: Rate::Control,
            special_index: 40_000,
            inputs: vec![],
            output_rates: vec![Rate::Control],
        });
        assert!(matches!(
            def.encode(),
            Err(SynthDefError::EncodingOverflow { field: "special index", .. })
        ));
    }

    #[test]
    fn variants_follow_ugens() {
        let mut def = empty("v");
        def.params.values = vec![0.5];
        def.variants.push(Variant {
            name: "hi".to_string(),
            values: vec![1.0],
        });
        let bytes = def.encode().unwrap();
        let tail = &bytes[bytes.len() - 9..];
        assert_eq!(tail, &[0, 1, 2, b'h', b'i', 0x3f, 0x80, 0, 0]);
    }

    #[test]
    fn multiple_definitions_share_header() {
        let bytes = encode_file(&[empty("a"), empty("b")]).unwrap();
        assert_eq!(&bytes[8..10], &[0, 2]);
        assert_eq!(bytes.len(), 10 + 2 * 20);
    }
}
