//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Upload = 0x01,
    Delete = 0x02,
    List = 0x03,
    Fetch = 0x04,
    Ping = 0x05,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a file; `size` raw bytes follow the frame on the stream
    Upload {
        name: String,
        size: u64,
        overwrite: bool,
    },

    /// Delete a file
    Delete { name: String },

    /// List stored files (`limit == 0` means the server maximum)
    List { limit: u32 },

    /// Download a file
    Fetch { name: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Upload { .. } => CommandType::Upload,
            Command::Delete { .. } => CommandType::Delete,
            Command::List { .. } => CommandType::List,
            Command::Fetch { .. } => CommandType::Fetch,
            Command::Ping => CommandType::Ping,
        }
    }
}
