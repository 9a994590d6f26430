//! The chip's logical operations, one module per command
//!
//! Every operation that talks to the tag is a [`CommandSequence`]; the one
//! exception is [`write_data`], which only builds a frame and leaves the
//! exchange to the caller.
//!
//! [`CommandSequence`]: crate::sequence::CommandSequence

mod authenticate;
mod get_file_settings;
mod get_version;
mod iso_read_binary;
mod iso_select_file;
mod read_data;
mod write_data;

pub use authenticate::AuthenticateEv2First;
pub use get_file_settings::GetFileSettings;
pub use get_version::{GetVersion, ProductionInfo, Version, VersionInfo};
pub use iso_read_binary::IsoReadBinary;
pub use iso_select_file::{IsoSelectFile, Selection};
pub use read_data::ReadData;
pub use write_data::write_data;

use bytes::BufMut;

/// Append a value as a 3-byte little-endian integer
pub(crate) fn put_u24_le(buf: &mut impl BufMut, value: u32) {
    buf.put_u8(value as u8);
    buf.put_u8((value >> 8) as u8);
    buf.put_u8((value >> 16) as u8);
}
