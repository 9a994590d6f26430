//! File-settings decoding, including the Secure Dynamic Messaging block
//!
//! The GetFileSettings response starts with a fixed header (file type, file
//! option, packed access rights, file size). When SDM is enabled it continues
//! with an options byte, two SDM access-rights bytes and a run of optional
//! 3-byte little-endian fields whose presence is gated by the flags and
//! access values decoded just before them.

use tracing::warn;

use crate::error::{Error, Result};

/// Communication mode of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommMode {
    /// No protection, plain transmission
    Plain,
    /// MAC protection for integrity and authenticity
    Mac,
    /// Full protection including confidentiality
    Full,
}

impl CommMode {
    /// Decode from the two low bits of the file option byte
    ///
    /// Bit 0 clear means plain regardless of bit 1; otherwise bit 1 selects
    /// full over MAC-only protection.
    const fn from_bits(bits: u8) -> Self {
        if bits & 0b01 == 0 {
            Self::Plain
        } else if bits & 0b10 != 0 {
            Self::Full
        } else {
            Self::Mac
        }
    }
}

/// Resolved access condition for one of the four file access slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessCondition {
    /// Access granted without authentication (0xE)
    Free,
    /// Access denied entirely (0xF)
    NoAccess,
    /// Access after authenticating with this key slot (0x0-0x4)
    Key(u8),
    /// Reserved for future use
    Rfu,
}

impl AccessCondition {
    const fn from_nibble(nibble: u8) -> Self {
        match nibble {
            0xF => Self::NoAccess,
            0xE => Self::Free,
            0x0..=0x4 => Self::Key(nibble),
            _ => Self::Rfu,
        }
    }
}

/// The four per-file access rights, one nibble each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRights {
    /// Read access
    pub read: AccessCondition,
    /// Write access
    pub write: AccessCondition,
    /// Combined read/write access
    pub read_write: AccessCondition,
    /// Right to change the file settings themselves
    pub change: AccessCondition,
}

impl AccessRights {
    /// Decode from the two packed bytes of the fixed header
    ///
    /// ReadWrite and Change occupy the first byte's high and low nibbles,
    /// Read and Write the second byte's.
    const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self {
            read: AccessCondition::from_nibble(bytes[1] >> 4),
            write: AccessCondition::from_nibble(bytes[1] & 0xF),
            read_write: AccessCondition::from_nibble(bytes[0] >> 4),
            change: AccessCondition::from_nibble(bytes[0] & 0xF),
        }
    }
}

/// SDM meta-read access: who may recover the mirrored PICC data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdmMetaRead {
    /// PICC data is not mirrored at all (0xF)
    NoMirroring,
    /// UID and read counter are mirrored in plain text (0xE)
    PlainMirroring,
    /// PICC data is mirrored encrypted under this key slot (0x0-0x4)
    Key(u8),
    /// Reserved for future use
    Rfu,
}

impl SdmMetaRead {
    const fn from_nibble(nibble: u8) -> Self {
        match nibble {
            0xF => Self::NoMirroring,
            0xE => Self::PlainMirroring,
            0x0..=0x4 => Self::Key(nibble),
            _ => Self::Rfu,
        }
    }
}

/// SDM file-read access: the key slot for the SDM MAC (and ENC) mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdmFileRead {
    /// No SDM MAC mirroring for this file (0xF)
    NoSdm,
    /// Reserved for future use (0xE)
    Rfu,
    /// MAC mirror computed under this key slot (0x0-0x4)
    Key(u8),
}

impl SdmFileRead {
    const fn from_nibble(nibble: u8) -> Self {
        match nibble {
            0xF => Self::NoSdm,
            0x0..=0x4 => Self::Key(nibble),
            _ => Self::Rfu,
        }
    }
}

/// The SDM access-rights pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdmAccessRights {
    /// Set when the reserved high nibble of the first byte carries 0xF
    pub rfu: bool,
    /// Access condition for counter retrieval
    pub ctr_ret: AccessCondition,
    /// Meta-read slot (first byte's high nibble of the second byte)
    pub meta_read: SdmMetaRead,
    /// File-read slot (second byte's low nibble)
    pub file_read: SdmFileRead,
}

impl SdmAccessRights {
    const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self {
            rfu: bytes[0] >> 4 == 0xF,
            ctr_ret: AccessCondition::from_nibble(bytes[0] & 0xF),
            meta_read: SdmMetaRead::from_nibble(bytes[1] >> 4),
            file_read: SdmFileRead::from_nibble(bytes[1] & 0xF),
        }
    }
}

/// Flag bits from the SDM options byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdmOptions {
    /// UID mirroring (bit 7)
    pub uid: bool,
    /// Read-counter mirroring (bit 6)
    pub read_ctr: bool,
    /// Read-counter limit active (bit 5)
    pub read_ctr_limit: bool,
    /// Encrypted file-data mirroring (bit 4)
    pub enc_file_data: bool,
    /// ASCII encoding of the mirrors (bit 0)
    pub ascii_encoding: bool,
}

impl SdmOptions {
    const fn from_byte(byte: u8) -> Self {
        Self {
            uid: byte & 0b1000_0000 != 0,
            read_ctr: byte & 0b0100_0000 != 0,
            read_ctr_limit: byte & 0b0010_0000 != 0,
            enc_file_data: byte & 0b0001_0000 != 0,
            ascii_encoding: byte & 0b0000_0001 != 0,
        }
    }
}

/// Decoded SDM sub-record of the file settings
///
/// Every offset field is optional; which ones the chip sends is gated by
/// [`SdmOptions`] and [`SdmAccessRights`], in the fixed order the decoder
/// consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdmSettings {
    /// Option flags
    pub options: SdmOptions,
    /// SDM access rights
    pub access_rights: SdmAccessRights,
    /// Mirror position of the plain UID
    pub uid_offset: Option<u32>,
    /// Mirror position of the plain read counter
    pub read_ctr_offset: Option<u32>,
    /// Mirror position of the encrypted PICC data
    pub picc_data_offset: Option<u32>,
    /// Start of the MAC input window
    pub mac_input_offset: Option<u32>,
    /// Mirror position of the encrypted file data
    pub enc_offset: Option<u32>,
    /// Length of the encrypted file data
    pub enc_length: Option<u32>,
    /// Mirror position of the SDM MAC
    pub mac_offset: Option<u32>,
    /// Read-counter limit
    pub read_ctr_limit: Option<u32>,
    /// Whether the gated fields consumed exactly the remaining payload
    ///
    /// Some chip configurations are known to report settings whose gated
    /// region does not line up with this decoder's field model; the mismatch
    /// is logged and recorded here rather than failing the whole decode.
    pub consistent: bool,
}

/// Decoded GetFileSettings response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSettings {
    /// Raw file type byte
    pub file_type: u8,
    /// Whether Secure Dynamic Messaging is enabled (file option bit 6)
    pub sdm_enabled: bool,
    /// Communication mode (file option bits 1-0)
    pub comm_mode: CommMode,
    /// Per-file access rights
    pub access_rights: AccessRights,
    /// File size in bytes (3-byte big-endian)
    pub file_size: u32,
    /// SDM sub-record, present when SDM is enabled
    pub sdm: Option<SdmSettings>,
}

/// Bounds-checked cursor over the gated SDM region
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Consume the next 3 bytes as a little-endian integer
    fn take_u24_le(&mut self) -> Option<u32> {
        let bytes = self.buf.get(self.pos..self.pos + 3)?;
        self.pos += 3;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }

    const fn at_end(&self) -> bool {
        self.pos == self.buf.len()
    }
}

impl FileSettings {
    /// Decode a GetFileSettings response payload (status word stripped)
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 7 {
            return Err(Error::Parse("file settings header truncated"));
        }

        let file_type = data[0];
        let file_option = data[1];
        let sdm_enabled = file_option & 0b0100_0000 != 0;
        let comm_mode = CommMode::from_bits(file_option & 0b11);
        let access_rights = AccessRights::from_bytes([data[2], data[3]]);
        let file_size =
            ((data[4] as u32) << 16) | ((data[5] as u32) << 8) | data[6] as u32;

        let sdm = if sdm_enabled {
            Some(Self::decode_sdm(data)?)
        } else {
            None
        };

        Ok(Self {
            file_type,
            sdm_enabled,
            comm_mode,
            access_rights,
            file_size,
            sdm,
        })
    }

    fn decode_sdm(data: &[u8]) -> Result<SdmSettings> {
        if data.len() < 10 {
            return Err(Error::Parse("SDM settings truncated"));
        }

        let options = SdmOptions::from_byte(data[7]);
        let access_rights = SdmAccessRights::from_bytes([data[8], data[9]]);

        let mut sdm = SdmSettings {
            options,
            access_rights,
            uid_offset: None,
            read_ctr_offset: None,
            picc_data_offset: None,
            mac_input_offset: None,
            enc_offset: None,
            enc_length: None,
            mac_offset: None,
            read_ctr_limit: None,
            consistent: true,
        };

        // Gated fields, consumed in chip order from byte 10. Overrun stops
        // the walk instead of failing it; see `SdmSettings::consistent`.
        let mut cursor = Cursor::new(data, 10);
        let complete = (|| -> Option<()> {
            if access_rights.meta_read == SdmMetaRead::PlainMirroring {
                if options.uid {
                    sdm.uid_offset = Some(cursor.take_u24_le()?);
                }
                if options.read_ctr {
                    sdm.read_ctr_offset = Some(cursor.take_u24_le()?);
                }
            }

            if matches!(access_rights.meta_read, SdmMetaRead::Key(_)) {
                sdm.picc_data_offset = Some(cursor.take_u24_le()?);
            }

            if access_rights.file_read != SdmFileRead::NoSdm {
                sdm.mac_input_offset = Some(cursor.take_u24_le()?);
                if options.enc_file_data {
                    sdm.enc_offset = Some(cursor.take_u24_le()?);
                    sdm.enc_length = Some(cursor.take_u24_le()?);
                }
                sdm.mac_offset = Some(cursor.take_u24_le()?);
            }

            if options.read_ctr_limit {
                sdm.read_ctr_limit = Some(cursor.take_u24_le()?);
            }

            Some(())
        })()
        .is_some();

        sdm.consistent = complete && cursor.at_end();
        if !sdm.consistent {
            warn!(
                consumed = cursor.pos,
                payload_len = data.len(),
                "SDM field gating did not land on end of payload"
            );
        }

        Ok(sdm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_plain_file_without_sdm() {
        // FileType 0, plain comm mode, SDM disabled, 128-byte file.
        let data = hex!("000000E0000080");
        let settings = FileSettings::from_bytes(&data).unwrap();
        assert_eq!(settings.file_type, 0);
        assert!(!settings.sdm_enabled);
        assert_eq!(settings.comm_mode, CommMode::Plain);
        assert_eq!(settings.file_size, 128);
        assert_eq!(settings.access_rights.read, AccessCondition::Key(0));
        assert_eq!(settings.access_rights.write, AccessCondition::Key(0));
        assert_eq!(settings.access_rights.read_write, AccessCondition::Free);
        assert_eq!(settings.access_rights.change, AccessCondition::Key(0));
        assert!(settings.sdm.is_none());
    }

    #[test]
    fn test_sdm_settings_with_picc_and_mac_mirrors() {
        // NDEF file of a tag provisioned for encrypted PICC data plus a MAC
        // mirror: SDM enabled, plain comm mode, everything free except the
        // settings-change right.
        let data = hex!("0040E0EE000100C1F0001800003B00003B0000");
        let settings = FileSettings::from_bytes(&data).unwrap();

        assert!(settings.sdm_enabled);
        assert_eq!(settings.comm_mode, CommMode::Plain);
        assert_eq!(settings.file_size, 256);
        assert_eq!(settings.access_rights.read, AccessCondition::Free);
        assert_eq!(settings.access_rights.write, AccessCondition::Free);
        assert_eq!(settings.access_rights.read_write, AccessCondition::Free);
        assert_eq!(settings.access_rights.change, AccessCondition::Key(0));

        let sdm = settings.sdm.unwrap();
        assert!(sdm.options.uid);
        assert!(sdm.options.read_ctr);
        assert!(!sdm.options.enc_file_data);
        assert!(sdm.options.ascii_encoding);
        assert!(sdm.access_rights.rfu);
        assert_eq!(sdm.access_rights.ctr_ret, AccessCondition::Key(0));
        assert_eq!(sdm.access_rights.meta_read, SdmMetaRead::Key(0));
        assert_eq!(sdm.access_rights.file_read, SdmFileRead::Key(0));

        // Meta-read resolves to a key slot, so the plain UID/counter mirrors
        // are absent and the encrypted PICC data offset is present.
        assert_eq!(sdm.uid_offset, None);
        assert_eq!(sdm.read_ctr_offset, None);
        assert_eq!(sdm.picc_data_offset, Some(24));
        assert_eq!(sdm.mac_input_offset, Some(59));
        assert_eq!(sdm.mac_offset, Some(59));
        assert_eq!(sdm.enc_offset, None);
        assert_eq!(sdm.read_ctr_limit, None);
        assert!(sdm.consistent);
    }

    #[test]
    fn test_sdm_inconsistent_length_is_soft() {
        // Known chip configuration whose gated region is one field short of
        // the model; must decode what it can and flag the mismatch.
        let data = hex!("004300E0000100C1F121200000430000");
        let settings = FileSettings::from_bytes(&data).unwrap();

        assert_eq!(settings.comm_mode, CommMode::Full);
        let sdm = settings.sdm.unwrap();
        assert_eq!(sdm.access_rights.meta_read, SdmMetaRead::Key(2));
        assert_eq!(sdm.access_rights.file_read, SdmFileRead::Key(1));
        assert_eq!(sdm.picc_data_offset, Some(32));
        assert_eq!(sdm.mac_input_offset, Some(67));
        assert_eq!(sdm.mac_offset, None);
        assert!(!sdm.consistent);
    }

    #[test]
    fn test_plain_mirroring_offsets() {
        // Meta-read 0xE: plain UID and counter mirrors with their offsets.
        let data = hex!("004000E0000100C0F1EF200000300000");
        let settings = FileSettings::from_bytes(&data).unwrap();
        let sdm = settings.sdm.unwrap();
        assert_eq!(sdm.access_rights.meta_read, SdmMetaRead::PlainMirroring);
        assert_eq!(sdm.access_rights.file_read, SdmFileRead::NoSdm);
        assert_eq!(sdm.uid_offset, Some(32));
        assert_eq!(sdm.read_ctr_offset, Some(48));
        assert_eq!(sdm.picc_data_offset, None);
        assert_eq!(sdm.mac_input_offset, None);
        assert!(sdm.consistent);
    }

    #[test]
    fn test_truncated_header_rejected() {
        assert!(matches!(
            FileSettings::from_bytes(&hex!("004000")),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            FileSettings::from_bytes(&hex!("004000E0000100C1")),
            Err(Error::Parse(_))
        ));
    }
}
