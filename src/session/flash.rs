// Flash slot
// Holds at most one success and one error message until read

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    success: Option<String>,
    error: Option<String>,
}

/// Messages taken out of a [`Flash`], in the shape pages read them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashMessages {
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

impl Flash {
    pub fn set_success(&mut self, message: impl Into<String>) {
        self.success = Some(message.into());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub const fn is_empty(&self) -> bool {
        self.success.is_none() && self.error.is_none()
    }

    /// Return the current messages and clear the slot
    pub fn take(&mut self) -> FlashMessages {
        FlashMessages {
            success_message: self.success.take(),
            error_message: self.error.take(),
        }
    }
}

impl FlashMessages {
    pub const fn is_empty(&self) -> bool {
        self.success_message.is_none() && self.error_message.is_none()
    }
}
