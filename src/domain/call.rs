use super::identity::Identity;
use super::value::NativeValue;
use serde::Deserialize;

/// Who is calling, and with how much value attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    pub sender: Identity,
    pub value: NativeValue,
}

impl CallContext {
    pub fn new(sender: Identity, value: NativeValue) -> Self {
        Self { sender, value }
    }

    /// A call with no value attached.
    pub fn from_sender(sender: Identity) -> Self {
        Self::new(sender, NativeValue::ZERO)
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Fund,
    Withdraw,
    CheaperWithdraw,
}

/// One entry of a recorded call log.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Call {
    pub call: CallKind,
    pub caller: Identity,
    pub value: Option<NativeValue>,
}

impl Call {
    pub fn context(&self) -> CallContext {
        CallContext::new(self.caller.clone(), self.value.unwrap_or_default())
    }
}
