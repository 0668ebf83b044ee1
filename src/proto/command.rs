use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Single byte opcodes used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Opcode {
    /// Host -> device, start session
    Connect = 0xAA,
    /// Device -> host, session accepted
    Ack = 0x55,
    /// Host -> device, request identification line
    Identify = 0xA4,
    /// Host -> device, request number of stored records
    RecordCount = 0xA2,
    /// Host -> device, request a record, followed by the 1-based index
    Record = 0xA3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Identify,
    RecordCount,
    /// Fetch record by 1-based slot index
    Record(u8),
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Connect => Opcode::Connect,
            Command::Identify => Opcode::Identify,
            Command::RecordCount => Opcode::RecordCount,
            Command::Record(_) => Opcode::Record,
        }
    }
}
