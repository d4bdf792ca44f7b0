//! A binary on-disk format for compiled programs (`.tac` files).
//!
//! The format is a 16-byte magic header followed by the
//! [postcard](https://docs.rs/postcard)-encoded [`Program`].

use core::fmt::{Display, Formatter};

use alloc::vec::Vec;

use crate::Program;

const TAC_MAGIC_PREFIX: &[u8; 4] = b"TAC\0";
const TAC_VERSION: &[u8; 2] = b"01";
#[rustfmt::skip]
const TAC_MAGIC: [u8; 16] = [ TAC_MAGIC_PREFIX[0], TAC_MAGIC_PREFIX[1], TAC_MAGIC_PREFIX[2], TAC_MAGIC_PREFIX[3], TAC_VERSION[0], TAC_VERSION[1], 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

fn validate_magic(tac: &[u8]) -> Result<usize, ArchiveError> {
    if tac.len() < TAC_MAGIC.len() || &tac[..TAC_MAGIC_PREFIX.len()] != TAC_MAGIC_PREFIX {
        return Err(ArchiveError::InvalidMagic);
    }
    if &tac[TAC_MAGIC_PREFIX.len()..TAC_MAGIC_PREFIX.len() + TAC_VERSION.len()] != TAC_VERSION {
        return Err(ArchiveError::InvalidVersion);
    }
    if tac[TAC_MAGIC_PREFIX.len() + TAC_VERSION.len()..TAC_MAGIC.len()] != [0; 10] {
        return Err(ArchiveError::InvalidPadding);
    }

    Ok(TAC_MAGIC.len())
}

/// Errors produced when reading or writing `.tac` archives.
#[derive(Debug)]
pub enum ArchiveError {
    InvalidMagic,
    InvalidVersion,
    InvalidPadding,
    InvalidArchive,
    EncodeFailed,
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ArchiveError::InvalidMagic => write!(f, "invalid tac archive: invalid magic number"),
            ArchiveError::InvalidVersion => write!(f, "invalid tac archive: invalid version"),
            ArchiveError::InvalidPadding => write!(f, "invalid tac archive: invalid padding"),
            ArchiveError::InvalidArchive => write!(f, "invalid tac archive: malformed program encoding"),
            ArchiveError::EncodeFailed => write!(f, "failed to encode program"),
        }
    }
}

impl core::error::Error for ArchiveError {}

impl Program {
    /// Decodes a [`Program`] from the bytes of a `.tac` archive.
    pub fn from_tac(tac: &[u8]) -> Result<Program, ArchiveError> {
        let len = validate_magic(tac)?;
        postcard::from_bytes(&tac[len..]).map_err(|_| ArchiveError::InvalidArchive)
    }

    /// Serializes the program into the bytes of a `.tac` archive.
    pub fn serialize_tac(&self) -> Result<Vec<u8>, ArchiveError> {
        let body = postcard::to_allocvec(self).map_err(|_| ArchiveError::EncodeFailed)?;
        let mut out = Vec::with_capacity(TAC_MAGIC.len() + body.len());
        out.extend_from_slice(&TAC_MAGIC);
        out.extend_from_slice(&body);
        Ok(out)
    }
}
