//! Secrets Configuration: credentials for third-party integrations.
//!
//! Layout:
//!   <configHome>/catalyst/config-<projectKey>.json
//!     { "catalyst": { "linear": {...}, "sentry": {...}, ... } }
//!
//! Each integration is a step `Value -> Value` over the whole document.
//! Steps are folded in order, so skipping any subset leaves the others
//! untouched.

use crate::error::{CatalystError, Result};
use crate::io;
use crate::paths;
use crate::prompt::Prompter;
use crate::workflow::{StepContext, WorkflowState};
use serde_json::{Map, Value};
use std::path::Path;

pub const SECRETS_ROOT_KEY: &str = "catalyst";

// ---------------------------------------------------------------------------
// Integration catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationKind {
    IssueTracker,
    ErrorMonitor,
    DeployPlatform,
    Analytics,
    Search,
}

impl IntegrationKind {
    pub fn describe(self) -> &'static str {
        match self {
            IntegrationKind::IssueTracker => "issue tracker",
            IntegrationKind::ErrorMonitor => "error monitor",
            IntegrationKind::DeployPlatform => "deploy platform",
            IntegrationKind::Analytics => "analytics",
            IntegrationKind::Search => "search API",
        }
    }
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub prompt: &'static str,
    /// Filled from the project's ticket prefix when one is set.
    pub from_ticket_prefix: bool,
}

#[derive(Debug)]
pub struct IntegrationSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: IntegrationKind,
    pub docs: &'static str,
    /// The first field is the credential.
    pub fields: &'static [FieldSpec],
}

impl IntegrationSpec {
    pub fn credential_field(&self) -> &'static str {
        self.fields[0].name
    }
}

const fn field(name: &'static str, prompt: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        prompt,
        from_ticket_prefix: false,
    }
}

pub const INTEGRATIONS: &[IntegrationSpec] = &[
    IntegrationSpec {
        key: "linear",
        label: "Linear",
        kind: IntegrationKind::IssueTracker,
        docs: "https://linear.app/settings/api",
        fields: &[
            field("apiToken", "Linear API token"),
            FieldSpec {
                name: "teamKey",
                prompt: "Linear team key",
                from_ticket_prefix: true,
            },
        ],
    },
    IntegrationSpec {
        key: "sentry",
        label: "Sentry",
        kind: IntegrationKind::ErrorMonitor,
        docs: "https://sentry.io/settings/account/api/auth-tokens/",
        fields: &[
            field("authToken", "Sentry auth token"),
            field("org", "Sentry organization slug"),
            field("project", "Sentry project slug"),
        ],
    },
    IntegrationSpec {
        key: "railway",
        label: "Railway",
        kind: IntegrationKind::DeployPlatform,
        docs: "https://railway.app/account/tokens",
        fields: &[
            field("token", "Railway API token"),
            field("projectId", "Railway project ID"),
        ],
    },
    IntegrationSpec {
        key: "posthog",
        label: "PostHog",
        kind: IntegrationKind::Analytics,
        docs: "https://posthog.com/docs/api",
        fields: &[
            field("apiKey", "PostHog personal API key"),
            field("projectId", "PostHog project ID"),
        ],
    },
    IntegrationSpec {
        key: "exa",
        label: "Exa",
        kind: IntegrationKind::Search,
        docs: "https://dashboard.exa.ai/api-keys",
        fields: &[field("apiKey", "Exa API key")],
    },
];

pub fn integration(key: &str) -> Option<&'static IntegrationSpec> {
    INTEGRATIONS.iter().find(|s| s.key == key)
}

// ---------------------------------------------------------------------------
// Document helpers
// ---------------------------------------------------------------------------

pub fn empty_document() -> Value {
    let mut root = Map::new();
    root.insert(SECRETS_ROOT_KEY.to_string(), Value::Object(Map::new()));
    Value::Object(root)
}

/// A value is a placeholder when blank or bracketed, e.g. `[NEEDS_SETUP]`.
pub fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || (v.starts_with('[') && v.ends_with(']'))
}

fn section<'a>(doc: &'a Value, spec: &IntegrationSpec) -> Option<&'a Map<String, Value>> {
    doc.get(SECRETS_ROOT_KEY)?.get(spec.key)?.as_object()
}

/// The stored credential for `spec`, unless missing or a placeholder.
pub fn configured_credential<'a>(doc: &'a Value, spec: &IntegrationSpec) -> Option<&'a str> {
    section(doc, spec)?
        .get(spec.credential_field())?
        .as_str()
        .filter(|v| !is_placeholder(v))
}

/// Integration keys present in the document, in catalogue order first.
pub fn configured_integrations(doc: &Value) -> Vec<String> {
    let Some(root) = doc.get(SECRETS_ROOT_KEY).and_then(Value::as_object) else {
        return vec![];
    };
    let mut keys: Vec<String> = INTEGRATIONS
        .iter()
        .filter(|s| root.contains_key(s.key))
        .map(|s| s.key.to_string())
        .collect();
    keys.extend(
        root.keys()
            .filter(|k| integration(k).is_none())
            .cloned(),
    );
    keys
}

/// Show the last four characters of a secret.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "\u{2022}".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("\u{2026}{tail}")
}

/// Copy of `doc` with every string under an integration masked.
pub fn masked(doc: &Value) -> Value {
    let mut out = doc.clone();
    if let Some(root) = out.get_mut(SECRETS_ROOT_KEY).and_then(Value::as_object_mut) {
        for (key, section) in root.iter_mut() {
            let Some(fields) = section.as_object_mut() else {
                continue;
            };
            let credential = integration(key).map(IntegrationSpec::credential_field);
            for (name, value) in fields.iter_mut() {
                let is_secret = credential.map_or(true, |c| c == name.as_str());
                if let (true, Some(s)) = (is_secret, value.as_str()) {
                    *value = Value::String(mask(s));
                }
            }
        }
    }
    out
}

/// Load the secrets document, adding an empty `catalyst` object when the
/// file lacks one. Any other shape is rejected.
pub fn load(config_home: &Path, project_key: &str) -> Result<Value> {
    let path = paths::secrets_config_path(config_home, project_key);
    normalize(io::read_json(&path)?.unwrap_or_else(empty_document)).map_err(|reason| {
        CatalystError::InvalidConfig {
            path: path.display().to_string(),
            reason,
        }
    })
}

fn normalize(mut doc: Value) -> std::result::Result<Value, String> {
    let Some(obj) = doc.as_object_mut() else {
        return Err("expected a JSON object".to_string());
    };
    let root = obj
        .entry(SECRETS_ROOT_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if !root.is_object() {
        return Err(format!("'{SECRETS_ROOT_KEY}' must be an object"));
    }
    Ok(doc)
}

pub fn save(config_home: &Path, project_key: &str, doc: &Value) -> Result<()> {
    io::write_json(&paths::secrets_config_path(config_home, project_key), doc)
}

// ---------------------------------------------------------------------------
// Decision layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationDecision {
    /// A real credential exists: ask whether to replace it.
    AskUpdate,
    /// Nothing usable stored: ask whether to configure at all.
    AskConfigure,
}

pub fn decide(doc: &Value, spec: &IntegrationSpec) -> IntegrationDecision {
    if configured_credential(doc, spec).is_some() {
        IntegrationDecision::AskUpdate
    } else {
        IntegrationDecision::AskConfigure
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Configure one integration, returning the new document.
///
/// Declining at any question returns `doc` unchanged. An empty credential
/// also leaves it unchanged.
pub fn configure_integration(
    doc: Value,
    spec: &IntegrationSpec,
    ticket_prefix: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let proceed = match decide(&doc, spec) {
        IntegrationDecision::AskUpdate => prompter.confirm(
            &format!("{} is already configured. Update it?", spec.label),
            false,
        )?,
        IntegrationDecision::AskConfigure => {
            prompter.confirm(&format!("Configure {}?", spec.label), false)?
        }
    };
    if !proceed {
        tracing::debug!(integration = spec.key, "left unchanged");
        return Ok(doc);
    }

    prompter.say(&format!(
        "  {} ({}): get credentials at {}",
        spec.label,
        spec.kind.describe(),
        spec.docs
    ));
    let mut fields = section(&doc, spec).cloned().unwrap_or_default();
    for f in spec.fields {
        let derived = ticket_prefix.filter(|_| f.from_ticket_prefix);
        let value = match derived {
            Some(prefix) => {
                prompter.say(&format!("  {}: {prefix} (from ticket prefix)", f.name));
                prefix.to_string()
            }
            None => {
                let current = fields
                    .get(f.name)
                    .and_then(Value::as_str)
                    .filter(|v| !is_placeholder(v))
                    .map(str::to_string);
                match current {
                    // Never echo a stored secret; empty input keeps it.
                    Some(secret) if f.name == spec.credential_field() => {
                        let question =
                            format!("{} (current {}, empty keeps it)", f.prompt, mask(&secret));
                        let entered = prompter.input(&question, None)?;
                        if entered.trim().is_empty() {
                            secret
                        } else {
                            entered
                        }
                    }
                    current => prompter.input(f.prompt, current.as_deref())?,
                }
            }
        };
        if f.name == spec.credential_field() && is_placeholder(&value) {
            prompter.say(&format!("  skipped: {} (no credential given)", spec.label));
            return Ok(doc);
        }
        fields.insert(f.name.to_string(), Value::String(value));
    }

    let mut doc = normalize(doc).map_err(|reason| CatalystError::InvalidConfig {
        path: "secrets document".to_string(),
        reason,
    })?;
    if let Some(root) = doc
        .get_mut(SECRETS_ROOT_KEY)
        .and_then(Value::as_object_mut)
    {
        root.insert(spec.key.to_string(), Value::Object(fields));
    }
    tracing::info!(integration = spec.key, "configured");
    prompter.say(&format!("  configured: {}", spec.label));
    Ok(doc)
}

/// Thread the document through every integration in catalogue order.
pub fn configure_all(
    doc: Value,
    ticket_prefix: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    INTEGRATIONS.iter().try_fold(doc, |doc, spec| {
        configure_integration(doc, spec, ticket_prefix, prompter)
    })
}

/// Workflow step: load, configure, and persist the secrets document.
///
/// The file is always written so its presence can be validated, even when
/// every integration is skipped.
pub fn write_secrets_config(
    state: WorkflowState,
    cx: &mut StepContext<'_>,
) -> Result<WorkflowState> {
    let key = state.identity.project_key.clone();
    let config_home = cx.settings.config_home.clone();
    let before = load(&config_home, &key)?;
    let after = configure_all(
        before.clone(),
        state.ticket_prefix.as_deref(),
        &mut *cx.prompter,
    )?;

    // Compare with the file as stored, so a file missing its root object
    // gets one written.
    let path = paths::secrets_config_path(&config_home, &key);
    let on_disk: Option<Value> = io::read_json(&path)?;
    if on_disk.as_ref() == Some(&after) {
        cx.prompter.say(&format!("  exists:  {}", path.display()));
    } else {
        save(&config_home, &key, &after)?;
        let verb = if on_disk.is_some() { "updated:" } else { "created:" };
        cx.prompter.say(&format!("  {verb} {}", path.display()));
    }
    Ok(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
