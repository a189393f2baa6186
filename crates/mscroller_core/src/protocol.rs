//! Request/response messages exchanged between the popup, the injection
//! service and a page agent. The JSON shapes match what the extension's
//! scripts put on the wire.
use serde::{Deserialize, Serialize};

/// Identifies a browser tab.
pub type TabId = u32;

/// Requests a page agent answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    Toggle,
    GetInfo,
    UpdateSpeed { speed: i64 },
    #[serde(rename = "showUI", alias = "showPanel")]
    ShowPanel,
}

/// Requests handled by the background context rather than a page agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BackgroundRequest {
    EnsureContentScript {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub scrolling: bool,
    pub speed: u32,
    pub title: String,
    /// Chapter id, or `"Unknown"` when none could be derived.
    pub chapter: String,
    /// Whole seconds since the page agent started.
    #[serde(rename = "sessionTime")]
    pub session_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Info(InfoResponse),
    Toggled { scrolling: bool },
    Ack { ok: bool },
}

impl Response {
    pub fn ack() -> Self {
        Response::Ack { ok: true }
    }
}

/// Outcome of an `ensureContentScript` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "InjectionWire", from = "InjectionWire")]
pub enum InjectionResponse {
    AlreadyInjected,
    Injected,
    Failed { error: String },
}

impl InjectionResponse {
    pub fn is_available(&self) -> bool {
        !matches!(self, InjectionResponse::Failed { .. })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum InjectionWire {
    Already {
        #[serde(rename = "alreadyInjected")]
        already_injected: bool,
    },
    Outcome {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl From<InjectionResponse> for InjectionWire {
    fn from(response: InjectionResponse) -> Self {
        match response {
            InjectionResponse::AlreadyInjected => InjectionWire::Already {
                already_injected: true,
            },
            InjectionResponse::Injected => InjectionWire::Outcome {
                success: true,
                error: None,
            },
            InjectionResponse::Failed { error } => InjectionWire::Outcome {
                success: false,
                error: Some(error),
            },
        }
    }
}

impl From<InjectionWire> for InjectionResponse {
    fn from(wire: InjectionWire) -> Self {
        match wire {
            InjectionWire::Already { .. } => InjectionResponse::AlreadyInjected,
            InjectionWire::Outcome { success: true, .. } => InjectionResponse::Injected,
            InjectionWire::Outcome {
                success: false,
                error,
            } => InjectionResponse::Failed {
                error: error.unwrap_or_default(),
            },
        }
    }
}
