use tmap_codec::{Decoder, Encoder};

use crate::error::{ProtoError, ProtoResult};

/// Raw opcode bytes as dispatched by the store.
pub mod opcodes {
    pub const SET_HEADER: u8 = b'h';
    pub const SET: u8 = b's';
    pub const CREATE: u8 = b'c';
    pub const REMOVE: u8 = b'r';
}

/// Operation tag. The raw byte only appears at the wire boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Create,
    Set,
    Remove,
    SetHeader,
}

impl Opcode {
    /// The byte written ahead of the operation's fields.
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Create => opcodes::CREATE,
            Self::Set => opcodes::SET,
            Self::Remove => opcodes::REMOVE,
            Self::SetHeader => opcodes::SET_HEADER,
        }
    }

    /// Parse a wire byte, if it names a known operation.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            opcodes::CREATE => Some(Self::Create),
            opcodes::SET => Some(Self::Set),
            opcodes::REMOVE => Some(Self::Remove),
            opcodes::SET_HEADER => Some(Self::SetHeader),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Set => "set",
            Self::Remove => "remove",
            Self::SetHeader => "set-header",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single mutation of a map object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Start an empty map with the given header, replacing any existing map.
    ///
    /// On the wire a create carries a map name string ahead of the header
    /// blob. The name labels the map for the writer and is not stored in
    /// the object body.
    Create { name: String, header: Vec<u8> },
    /// Insert or overwrite the entry for `key`.
    Set { key: String, value: Vec<u8> },
    /// Delete the entry for `key`. Absent keys are a no-op.
    Remove { key: String },
    /// Replace the header, keeping all entries.
    SetHeader { header: Vec<u8> },
}

impl Operation {
    /// A create with an empty map name.
    pub fn create(header: impl Into<Vec<u8>>) -> Self {
        Self::create_named(String::new(), header)
    }

    pub fn create_named(name: impl Into<String>, header: impl Into<Vec<u8>>) -> Self {
        Self::Create {
            name: name.into(),
            header: header.into(),
        }
    }

    pub fn set(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }

    pub fn set_header(header: impl Into<Vec<u8>>) -> Self {
        Self::SetHeader {
            header: header.into(),
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Create { .. } => Opcode::Create,
            Self::Set { .. } => Opcode::Set,
            Self::Remove { .. } => Opcode::Remove,
            Self::SetHeader { .. } => Opcode::SetHeader,
        }
    }

    /// The key this operation touches, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Set { key, .. } | Self::Remove { key } => Some(key),
            Self::Create { .. } | Self::SetHeader { .. } => None,
        }
    }

    /// Append `[opcode][fields]` to `enc`.
    pub(crate) fn encode_into(&self, enc: &mut Encoder) {
        enc.put_u8(self.opcode().as_byte());
        match self {
            Self::Create { name, header } => {
                enc.put_str(name).put_blob(header);
            }
            Self::SetHeader { header } => {
                enc.put_blob(header);
            }
            Self::Set { key, value } => {
                enc.put_str(key).put_blob(value);
            }
            Self::Remove { key } => {
                enc.put_str(key);
            }
        }
    }

    /// Read one `[opcode][fields]` record from `dec`.
    pub(crate) fn decode_from(dec: &mut Decoder<'_>) -> ProtoResult<Self> {
        let byte = dec.get_u8()?;
        let opcode = Opcode::from_byte(byte).ok_or(ProtoError::UnknownOpcode(byte))?;
        let op = match opcode {
            Opcode::Create => {
                let name = dec.get_str()?;
                Self::create_named(name, dec.get_blob()?)
            }
            Opcode::SetHeader => Self::set_header(dec.get_blob()?),
            Opcode::Set => {
                let key = dec.get_str()?;
                Self::set(key, dec.get_blob()?)
            }
            Opcode::Remove => Self::remove(dec.get_str()?),
        };
        Ok(op)
    }
}
