use serde::Deserialize;

// WebDriver wire responses (W3C)
//
// {"value": ...}
//  ├── new session      → { sessionId, capabilities }
//  ├── find elements    → [ { "element-6066-...": id }, ... ]
//  ├── text / attribute → string | null
//  ├── displayed        → bool
//  ├── screenshot       → base64 string
//  └── error            → { error, message, stacktrace }

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub struct NewSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub capabilities: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ElementHandle {
    // Pre-W3C drivers still answer with "ELEMENT".
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf", alias = "ELEMENT")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: Option<String>,
}
