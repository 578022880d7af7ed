use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(InterfaceId);
id_newtype!(NetboxId);

/// Operational/administrative status of an interface, carried on the wire
/// as the SNMP integer encoding (1 = up, 2 = down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum OperStatus {
    Up,
    Down,
    Other(i64),
}

impl OperStatus {
    pub fn is_up(self) -> bool {
        matches!(self, OperStatus::Up)
    }
}

impl From<i64> for OperStatus {
    fn from(value: i64) -> Self {
        match value {
            1 => OperStatus::Up,
            2 => OperStatus::Down,
            other => OperStatus::Other(other),
        }
    }
}

impl From<OperStatus> for i64 {
    fn from(value: OperStatus) -> Self {
        match value {
            OperStatus::Up => 1,
            OperStatus::Down => 2,
            OperStatus::Other(other) => other,
        }
    }
}
