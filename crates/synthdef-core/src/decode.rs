//! Decoder for `SCgf` files, versions 1 and 2.
//!
//! Version 1 has the same layout as version 2 with 16-bit counts and
//! indices. Decoded definitions re-encode as version 2.

use std::io::{Cursor, ErrorKind, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::encode::MAGIC;
use crate::error::{Result, SynthDefError};
use crate::params::{ParamName, ParamTable};
use crate::rate::Rate;
use crate::synthdef::{InputSpec, SynthDef, UGenSpec, Variant};

struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
    version: i32,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            version: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SynthDefError {
        SynthDefError::Decode {
            offset: self.cursor.position(),
            reason: reason.into(),
        }
    }

    fn io(&self, err: std::io::Error) -> SynthDefError {
        if err.kind() == ErrorKind::UnexpectedEof {
            self.error("unexpected end of data")
        } else {
            SynthDefError::Io(err)
        }
    }

    fn u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(|e| self.io(e))
    }

    fn i8(&mut self) -> Result<i8> {
        self.cursor.read_i8().map_err(|e| self.io(e))
    }

    fn i16(&mut self) -> Result<i16> {
        self.cursor.read_i16::<BigEndian>().map_err(|e| self.io(e))
    }

    fn i32(&mut self) -> Result<i32> {
        self.cursor.read_i32::<BigEndian>().map_err(|e| self.io(e))
    }

    fn f32(&mut self) -> Result<f32> {
        self.cursor.read_f32::<BigEndian>().map_err(|e| self.io(e))
    }

    /// A count or index: int16 in version 1, int32 in version 2.
    fn int(&mut self) -> Result<i32> {
        if self.version == 1 {
            self.i16().map(i32::from)
        } else {
            self.i32()
        }
    }

    /// Width in bytes of a count or index.
    fn int_len(&self) -> usize {
        if self.version == 1 { 2 } else { 4 }
    }

    fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    /// Reads a count of records at least `min_len` bytes each.
    ///
    /// Counts the remaining data cannot hold are rejected before anything
    /// is allocated for them.
    fn count(&mut self, what: &str, min_len: usize) -> Result<usize> {
        let n = self.int()?;
        self.bounded(what, n, min_len)
    }

    fn bounded(&self, what: &str, n: i32, min_len: usize) -> Result<usize> {
        let n = usize::try_from(n).map_err(|_| self.error(format!("negative {what} count {n}")))?;
        let remaining = self.remaining();
        if n.saturating_mul(min_len) > remaining {
            return Err(self.error(format!("{what} count {n} exceeds the {remaining} bytes left")));
        }
        Ok(n)
    }

    fn pstring(&mut self) -> Result<String> {
        let len = self.u8()? as usize;
        let mut buf = vec![0; len];
        self.cursor.read_exact(&mut buf).map_err(|e| self.io(e))?;
        String::from_utf8(buf).map_err(|_| self.error("string is not valid UTF-8"))
    }

    fn rate(&mut self) -> Result<Rate> {
        let code = self.i8()?;
        u8::try_from(code)
            .ok()
            .and_then(Rate::from_code)
            .ok_or_else(|| self.error(format!("invalid rate code {code}")))
    }

    fn floats(&mut self, n: usize) -> Result<Vec<f32>> {
        (0..n).map(|_| self.f32()).collect()
    }

    fn definition(&mut self) -> Result<SynthDef> {
        let name = self.pstring()?;

        let w = self.int_len();

        let k = self.count("constant", 4)?;
        let constants = self.floats(k)?;

        let p = self.count("parameter", 4)?;
        let values = self.floats(p)?;

        let n = self.count("parameter name", 1 + w)?;
        let mut names = Vec::with_capacity(n);
        for _ in 0..n {
            let name = self.pstring()?;
            let index = self.int()?;
            let index = u32::try_from(index)
                .ok()
                .filter(|&i| (i as usize) < p)
                .ok_or_else(|| self.error(format!("parameter '{name}' index {index} out of range")))?;
            names.push(ParamName { name, index });
        }

        // Type tag length, rate, input and output counts, special index.
        let u = self.count("ugen", 4 + 2 * w)?;
        let mut ugens = Vec::with_capacity(u);
        for _ in 0..u {
            ugens.push(self.ugen(k, u)?);
        }

        let v = self.i16()?;
        let v = self.bounded("variant", i32::from(v), 1 + 4 * p)?;
        let mut variants = Vec::with_capacity(v);
        for _ in 0..v {
            let name = self.pstring()?;
            let values = self.floats(p)?;
            variants.push(Variant { name, values });
        }

        Ok(SynthDef {
            name,
            constants,
            params: ParamTable { values, names },
            ugens,
            variants,
        })
    }

    fn ugen(&mut self, constant_count: usize, ugen_count: usize) -> Result<UGenSpec> {
        let type_tag = self.pstring()?;
        let rate = self.rate()?;
        let w = self.int_len();
        let input_count = self.int()?;
        let output_count = self.int()?;
        let special_index = i32::from(self.i16()?);
        let input_count = self.bounded("input", input_count, 2 * w)?;
        let output_count = self.bounded("output", output_count, 1)?;

        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let source = self.int()?;
            let slot = self.int()?;
            let input = match (source, u32::try_from(slot)) {
                (-1, Ok(index)) if (index as usize) < constant_count => InputSpec::Constant(index),
                (ugen, Ok(output)) if ugen >= 0 && (ugen as usize) < ugen_count => InputSpec::Wire {
                    ugen: ugen as u32,
                    output,
                },
                _ => {
                    return Err(self.error(format!(
                        "{type_tag} input ({source}, {slot}) references nothing"
                    )));
                }
            };
            inputs.push(input);
        }

        let output_rates = (0..output_count)
            .map(|_| self.rate())
            .collect::<Result<Vec<_>>>()?;

        Ok(UGenSpec {
            type_tag,
            rate,
            special_index,
            inputs,
            output_rates,
        })
    }
}

/// Decodes every definition in a version 1 or 2 file.
pub fn decode(bytes: &[u8]) -> Result<Vec<SynthDef>> {
    let mut r = Reader::new(bytes);

    let mut magic = [0u8; 4];
    r.cursor.read_exact(&mut magic).map_err(|e| r.io(e))?;
    if &magic != MAGIC {
        return Err(SynthDefError::Decode {
            offset: 0,
            reason: "missing SCgf header".to_string(),
        });
    }

    r.version = r.i32()?;
    if r.version != 1 && r.version != 2 {
        return Err(r.error(format!("unsupported format version {}", r.version)));
    }

    let count = usize::try_from(r.i16()?).map_err(|_| r.error("negative definition count"))?;
    let defs = (0..count)
        .map(|_| r.definition())
        .collect::<Result<Vec<_>>>()?;

    if (r.cursor.position() as usize) < bytes.len() {
        return Err(r.error("trailing bytes after last definition"));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("decode: version {}, {} definition(s)", r.version, defs.len());

    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_file;

    fn v1_file() -> Vec<u8> {
        let mut b = b"SCgf".to_vec();
        b.extend([0, 0, 0, 1, 0, 1]);
        b.extend([1, b'x']);
        b.extend([0, 1, 0x3f, 0x80, 0, 0]); // K = 1, [1.0]
        b.extend([0, 1, 0, 0, 0, 0]); // P = 1, [0.0]
        b.extend([0, 1, 3, b'a', b'm', b'p', 0, 0]); // amp -> 0
        b.extend([0, 2]); // U = 2
        b.extend([7, b'C', b'o', b'n', b't', b'r', b'o', b'l', 1, 0, 0, 0, 1, 0, 0]);
        b.push(1);
        b.extend([3, b'O', b'u', b't', 2, 0, 2, 0, 0, 0, 0]);
        b.extend([0xff, 0xff, 0, 0, 0, 0, 0, 0]);
        b.extend([0, 0]); // no variants
        b
    }

    #[test]
    fn decodes_version_one() {
        let defs = decode(&v1_file()).unwrap();
        assert_eq!(defs.len(), 1);
        let def = &defs[0];
        assert_eq!(def.name, "x");
        assert_eq!(def.constants, vec![1.0]);
        assert_eq!(def.params.names[0].name, "amp");
        assert_eq!(def.ugens[1].type_tag, "Out");
        assert_eq!(
            def.ugens[1].inputs,
            vec![InputSpec::Constant(0), InputSpec::Wire { ugen: 0, output: 0 }]
        );
    }

    #[test]
    fn version_one_reencodes_as_version_two() {
        let defs = decode(&v1_file()).unwrap();
        let v2 = encode_file(&defs).unwrap();
        assert_eq!(&v2[4..8], &[0, 0, 0, 2]);
        assert_eq!(decode(&v2).unwrap(), defs);
    }

    #[test]
    fn rejects_bad_magic_and_version() {
        assert!(matches!(
            decode(b"XXXX\0\0\0\x02\0\0"),
            Err(SynthDefError::Decode { offset: 0, .. })
        ));
        assert!(matches!(
            decode(b"SCgf\0\0\0\x03\0\0"),
            Err(SynthDefError::Decode { .. })
        ));
    }

    #[test]
    fn truncated_input_reports_offset() {
        let bytes = v1_file();
        let err = decode(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, SynthDefError::Decode { ref reason, .. } if reason.contains("end of data")));
    }

    #[test]
    fn dangling_input_is_rejected() {
        let mut bytes = v1_file();
        // Point Out's wire input at ugen 5.
        let at = bytes.len() - 5;
        bytes[at] = 5;
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn oversized_counts_are_rejected_before_allocating() {
        // Version 2, one definition "x", no constants, params or names, then
        // a ugen count of i32::MAX with no ugens following.
        let bytes = b"SCgf\0\0\0\x02\0\x01\x01x\0\0\0\0\0\0\0\0\0\0\0\0\x7f\xff\xff\xff";
        let err = decode(bytes).unwrap_err();
        assert!(matches!(err, SynthDefError::Decode { ref reason, .. } if reason.contains("ugen count")));

        // Same for constants.
        let bytes = b"SCgf\0\0\0\x02\0\x01\x01x\x7f\xff\xff\xff";
        assert!(matches!(decode(bytes), Err(SynthDefError::Decode { .. })));
    }

    #[test]
    fn oversized_input_count_is_rejected() {
        let mut bytes = v1_file();
        // Out's input count sits before its output count, special index, two inputs, and the variant count.
        let at = bytes.len() - 2 - 8 - 2 - 2 - 2;
        assert_eq!(&bytes[at..at + 2], &[0, 2]);
        bytes[at] = 0x7f;
        bytes[at + 1] = 0xff;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SynthDefError::Decode { ref reason, .. } if reason.contains("input count")));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = v1_file();
        bytes.push(0);
        assert!(decode(&bytes).is_err());
    }
}
