use byteorder::{LittleEndian, WriteBytesExt};
use std::fmt::Debug;
use std::hash::Hash;
use std::io::{Seek, Write};
use tracing::{instrument, warn};

use crate::error::{Error, Result};
use crate::state::LayoutState;
use crate::write::{align, table_len, write_offset_table, TableInfo};

/// Write every interned string followed by the table of their offsets
///
/// Each entry is 2 byte aligned and made of a u16 byte length and the UTF-8 bytes.
#[instrument(skip_all, err, fields(count = state.string_count()))]
pub(crate) fn write_string_table<H, O>(state: &LayoutState<H>, out: &mut O) -> Result<TableInfo>
where
    H: Copy + Eq + Hash + Debug,
    O: Write + Seek,
{
    let mut offsets = Vec::with_capacity(state.string_count());

    for text in state.strings() {
        if text.chars().any(char::is_control) {
            warn!(text, "string contains control characters, the source may be misdecoded");
        }

        let length = u16::try_from(text.len()).map_err(|_| Error::StringTooLong(text.len()))?;

        offsets.push(align(out, 2)?);
        out.write_u16::<LittleEndian>(length)?;
        out.write_all(text.as_bytes())?;
    }

    Ok(TableInfo {
        count: table_len(offsets.len(), "string")?,
        offset: write_offset_table(out, &offsets)?,
    })
}
