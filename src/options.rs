// Post options
// ------------
// `PostOptions` is the one bag of settings threaded from the command line
// and the config file down to the publishers. Every known key is an
// `Option` so that layers can be stacked with `merge`; keys the tool does
// not know about are kept in `extra` and forwarded to the blog unchanged.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_TITLE: &str = "{soundcloud::full_title}";
pub const DEFAULT_BODY: &str = r#"<p>{soundcloud::code}</p><p>Posted using <a href="http://github.com/hannestyden/soundlrous">Soundlrous</a></p>"#;
pub const DEFAULT_COLOR: &str = "ff6600";
pub const DEFAULT_SIZE: u32 = 425;
pub const DEFAULT_PLAYER_TYPE: &str = "artwork";
pub const DEFAULT_TAGS: &str = "soundcloud, soundlrous";

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct PostOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Player type shown by the embed (`artwork`, `tiny`, ...).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub player_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Stored as `passw`; `password` is read too when `passw` is absent.
    #[serde(rename = "passw", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
    /// Tumblr post type, sent as the `type` form field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    /// SoundCloud API client id used by the resolve call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PostOptions {
    /// Built-in defaults, the bottom layer of every merge.
    pub fn defaults() -> Self {
        Self {
            title: Some(DEFAULT_TITLE.to_string()),
            body: Some(DEFAULT_BODY.to_string()),
            color: Some(DEFAULT_COLOR.to_string()),
            size: Some(DEFAULT_SIZE),
            player_type: Some(DEFAULT_PLAYER_TYPE.to_string()),
            tags: Some(DEFAULT_TAGS.to_string()),
            ..Self::default()
        }
    }

    /// Right-biased merge: every key set in `overlay` wins, keys it leaves
    /// unset keep the value from `self`.
    pub fn merge(self, overlay: PostOptions) -> PostOptions {
        let mut extra = self.extra;
        extra.extend(overlay.extra);

        PostOptions {
            url: overlay.url.or(self.url),
            title: overlay.title.or(self.title),
            body: overlay.body.or(self.body),
            color: overlay.color.or(self.color),
            size: overlay.size.or(self.size),
            player_type: overlay.player_type.or(self.player_type),
            tags: overlay.tags.or(self.tags),
            email: overlay.email.or(self.email),
            password: overlay.password.or(self.password),
            service: overlay.service.or(self.service),
            save: overlay.save.or(self.save),
            post_type: overlay.post_type.or(self.post_type),
            client_id: overlay.client_id.or(self.client_id),
            extra,
        }
    }

    /// Copy suitable for the config file: everything but `url` and `save`.
    pub fn persistable(&self) -> PostOptions {
        PostOptions {
            url: None,
            save: None,
            ..self.clone()
        }
    }

    /// Caller-supplied fields forwarded to the blog: the rendered title and
    /// body, the tags and every unknown key.
    pub fn post_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(("title".to_string(), title.clone()));
        }
        if let Some(body) = &self.body {
            fields.push(("body".to_string(), body.clone()));
        }
        if let Some(tags) = &self.tags {
            fields.push(("tags".to_string(), tags.clone()));
        }
        for (key, value) in &self.extra {
            fields.push((key.clone(), value_to_field(value)));
        }
        fields
    }

    /// Build options from a JSON object one key at a time.
    ///
    /// Keys are normalized first. A known key whose value has the wrong
    /// type is left unset and its name returned, so one bad entry never
    /// costs the rest of the object. `null` counts as unset.
    pub fn from_object(object: Map<String, Value>) -> (Self, Vec<String>) {
        let mut options = PostOptions::default();
        let mut rejected = Vec::new();
        let mut password_alias = None;

        for (key, value) in object {
            let key = normalize_key(&key);
            let value = normalize_keys(value);
            let accepted = match key.as_str() {
                "url" => set_string(&mut options.url, value),
                "title" => set_string(&mut options.title, value),
                "body" => set_string(&mut options.body, value),
                "color" => set_string(&mut options.color, value),
                "size" => set_size(&mut options.size, value),
                "type" => set_string(&mut options.player_type, value),
                "tags" => set_string(&mut options.tags, value),
                "email" => set_string(&mut options.email, value),
                "passw" => set_string(&mut options.password, value),
                "password" => set_string(&mut password_alias, value),
                "service" => set_string(&mut options.service, value),
                "save" => set_bool(&mut options.save, value),
                "post_type" => set_string(&mut options.post_type, value),
                "client_id" => set_string(&mut options.client_id, value),
                _ => {
                    options.extra.insert(key.clone(), value);
                    true
                }
            };
            if !accepted {
                rejected.push(key);
            }
        }

        if options.password.is_none() {
            options.password = password_alias;
        }
        (options, rejected)
    }
}

fn set_string(slot: &mut Option<String>, value: Value) -> bool {
    match value {
        Value::String(s) => {
            *slot = Some(s);
            true
        }
        Value::Null => true,
        _ => false,
    }
}

/// Sizes are pixel counts; a numeric string is read as a number too.
fn set_size(slot: &mut Option<u32>, value: Value) -> bool {
    let size = match &value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null => return true,
        _ => None,
    };
    match size {
        Some(size) => {
            *slot = Some(size);
            true
        }
        None => false,
    }
}

fn set_bool(slot: &mut Option<bool>, value: Value) -> bool {
    match value {
        Value::Bool(b) => {
            *slot = Some(b);
            true
        }
        Value::Null => true,
        _ => false,
    }
}

/// Form fields are strings; JSON strings lose their quotes, anything else
/// keeps its JSON text.
fn value_to_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Canonical form of an object key: trimmed, lowercase, `-` spelled `_`.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

/// Return `value` with every object key, at any depth, normalized.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (normalize_key(&key), normalize_keys(inner)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}
