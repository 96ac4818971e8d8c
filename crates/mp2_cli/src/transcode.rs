//! JSON <-> mp2 conversion

use mp2_core::Config;

use crate::err::CliError;

/// Parse a JSON document and encode it as a single mp2 value.
pub(crate) fn json_to_mp2(input: &[u8]) -> Result<Vec<u8>, CliError> {
    let value: serde_json::Value = serde_json::from_slice(input)?;
    let bytes = mp2_core::to_vec(&value)?;

    log::debug!("encoded {} json bytes into {} mp2 bytes", input.len(), bytes.len());
    Ok(bytes)
}

/// Decode a single mp2 value and render it as JSON.
///
/// Mapping keys must be valid UTF-8 strings. Unit and `None` come out as `[]`.
pub(crate) fn mp2_to_json(input: &[u8], config: Config, pretty: bool) -> Result<Vec<u8>, CliError> {
    let value: serde_json::Value = mp2_core::from_slice_with_config(input, config)?;

    let mut out = match pretty {
        true => serde_json::to_vec_pretty(&value)?,
        false => serde_json::to_vec(&value)?,
    };
    out.push(b'\n');

    Ok(out)
}
