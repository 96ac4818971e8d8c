//! Human readable listing of an mp2 tag stream

use std::io::Write;

use mp2_core::{decode_header, scalar, ByteViewer, Config, Error, Header};

use crate::err::CliError;

/// Write one line per encoded value: offset, tag byte and decoded header,
/// indented by nesting depth.
///
/// The input may hold several values back to back.
pub(crate) fn dump<W: Write>(bytes: &[u8], config: &Config, out: &mut W) -> Result<(), CliError> {
    let mut viewer = ByteViewer::from_slice(bytes);
    // items still expected by each open container
    let mut pending: Vec<u64> = vec![];

    while !viewer.is_end() {
        let depth = pending.len();
        let offset = viewer.offset();
        let tag = viewer.peek().ok_or(Error::Truncated)?;

        let header = decode_header(&mut viewer)?;
        let detail = describe(&header, &mut viewer)?;
        writeln!(out, "{:>8}  {:02X}  {}{}", offset, tag, "  ".repeat(depth), detail)?;

        if let Some(parent) = pending.last_mut() {
            *parent -= 1;
        }

        let items = match header {
            Header::Seq { count, .. } => count,
            Header::Map { count, .. } => count.saturating_mul(2),
            _ => 0,
        };
        if items > 0 {
            if depth >= config.max_depth {
                return Err(viewer.fail(Error::DepthLimitExceeded).into());
            }
            pending.push(items);
        }

        while let Some(0) = pending.last() {
            pending.pop();
        }
    }

    match pending.is_empty() {
        true => Ok(()),
        false => Err(viewer.fail(Error::Truncated).into()),
    }
}

/// Describe a header, consuming any payload that is not a nested value.
fn describe(header: &Header, viewer: &mut ByteViewer) -> Result<String, CliError> {
    let detail = match *header {
        Header::Uint { value, .. } => format!("uint {}", value),
        Header::Sint { magnitude, .. } => format!("int -{}", magnitude),
        Header::Bool(value) => format!("bool {}", value),
        Header::Real => {
            let exponent = scalar::read_int::<i64>(viewer)?;
            let mantissa = scalar::read_int::<i64>(viewer)?;
            format!(
                "real {} (mantissa {}, exponent {})",
                scalar::real_from_components(exponent, mantissa),
                mantissa,
                exponent
            )
        }
        Header::Str { len, .. } => {
            viewer.ensure(len)?;
            let bytes = viewer.next_bytes(len as usize)?;

            match std::str::from_utf8(bytes) {
                Ok(s) => format!("str {:?}", s),
                Err(_) => format!("bytes {:02X?}", bytes),
            }
        }
        Header::Seq { count, .. } => format!("seq [{}]", count),
        Header::Map { count, .. } => format!("map {{{}}}", count),
    };

    Ok(detail)
}
