//! User (manager/agent) profiles returned by the users endpoint.

use serde::{Deserialize, Serialize};

/// A VPBX user. Not a caller: these are the people answering calls.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct User {
    pub general: General,
    pub telephony: Telephony,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct General {
    pub name: String,
    pub email: String,
    pub department: String,
    pub position: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Telephony {
    /// Primary internal extension.
    pub extension: String,
    /// Number shown to callees on outgoing calls.
    pub outgoingline: String,
    /// Numbers rung for this user, in provider order.
    pub numbers: Vec<PhoneNumber>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PhoneNumber {
    pub number: String,
    /// e.g. `sip` or `tel`.
    pub protocol: String,
    /// Ring priority; lower rings first.
    pub order: i32,
    /// Seconds to ring before moving to the next number.
    pub wait_sec: i32,
    pub status: String,
}

impl User {
    pub fn name(&self) -> &str {
        &self.general.name
    }

    pub fn extension(&self) -> &str {
        &self.telephony.extension
    }

    /// Numbers sorted by ring priority.
    pub fn numbers_by_order(&self) -> Vec<&PhoneNumber> {
        let mut numbers: Vec<&PhoneNumber> = self.telephony.numbers.iter().collect();
        numbers.sort_by_key(|n| n.order);
        numbers
    }
}
