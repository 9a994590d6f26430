//! Instruction codes and protocol constants for the NTAG424 DNA

/// Class byte for the chip's proprietary (MFG) command set
pub const CLA_PROPRIETARY: u8 = 0x90;

/// Class byte for the ISO 7816 command set
pub const CLA_ISO: u8 = 0x00;

/// Maximum WriteData payload per frame
pub const MAX_WRITE_LEN: usize = 248;

/// Instruction codes, CLA = 0x90 unless noted
pub mod ins {
    /// SetConfiguration
    pub const SET_CONFIGURATION: u8 = 0x5C;
    /// ChangeFileSettings
    pub const CHANGE_FILE_SETTINGS: u8 = 0x5F;
    /// ChangeKey
    pub const CHANGE_KEY: u8 = 0xC4;
    /// GetFileCounters
    pub const GET_FILE_COUNTERS: u8 = 0xF6;
    /// GetFileSettings
    pub const GET_FILE_SETTINGS: u8 = 0xF5;
    /// GetKeyVersion
    pub const GET_KEY_VERSION: u8 = 0x64;
    /// GetCardUID
    pub const GET_CARD_UID: u8 = 0x51;
    /// ReadSig
    pub const READ_SIG: u8 = 0x3C;
    /// GetVersion
    pub const GET_VERSION: u8 = 0x60;
    /// ReadData
    pub const READ_DATA: u8 = 0xAD;
    /// WriteData
    pub const WRITE_DATA: u8 = 0x8D;
    /// AuthenticateEV2First
    pub const AUTHENTICATE_FIRST: u8 = 0x71;
    /// AuthenticateEV2NonFirst
    pub const AUTHENTICATE_NON_FIRST: u8 = 0x77;
    /// Continuation of a chained command
    pub const ADDITIONAL_FRAME: u8 = 0xAF;

    /// ISO ReadBinary (CLA = 0x00)
    pub const ISO_READ_BINARY: u8 = 0xB0;
    /// ISO UpdateBinary (CLA = 0x00)
    pub const ISO_UPDATE_BINARY: u8 = 0xD6;
    /// ISO SelectFile (CLA = 0x00)
    pub const ISO_SELECT_FILE: u8 = 0xA4;
}

/// ISO file identifiers baked into the chip
pub mod iso_ids {
    /// DF name of the PICC-level MF
    pub const PICC_MF_NAME: &[u8] = &[0xD2, 0x76, 0x00, 0x00, 0x85, 0x01, 0x01];
    /// File identifier of the PICC-level MF
    pub const PICC_MF_ID: u16 = 0x3F00;
    /// DF name of the NDEF application
    pub const APP_DF_NAME: &[u8] = &[0xD2, 0x76, 0x00, 0x00, 0x85, 0x01, 0x01];
    /// File identifier of the NDEF application DF
    pub const APP_DF_ID: u16 = 0xE110;
}
