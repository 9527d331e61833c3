// SoundCloud resolver
// -------------------
// Turns a permalink into the two things a post needs: a display title and
// the player markup. One GET against the public resolve endpoint, no retry.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::api::Transport;
use crate::error::{ResolveError, Result};
use crate::options::{normalize_keys, PostOptions, DEFAULT_COLOR, DEFAULT_PLAYER_TYPE, DEFAULT_SIZE};
use crate::template;

pub const RESOLVE_ENDPOINT: &str = "http://api.soundcloud.com/resolve";

/// Flash player markup. `{url}` must already be percent-encoded.
pub const EMBED_CODE: &str = r#"<object height="{size}" width="{size}">
  <param name="movie" value="http://player.soundcloud.com/player.swf?url={url}&amp;auto_play=false&amp;player_type={type}&amp;color={color}"></param>
  <param name="allowscriptaccess" value="always"></param>
  <embed
    allowscriptaccess="always" height="{size}"
    src="http://player.soundcloud.com/player.swf?url={url}&amp;auto_play=false&amp;player_type={type}&amp;color={color}"
    type="application/x-shockwave-flash" width="{size}"></embed>
</object>
"#;

/// Everything but ASCII alphanumerics and `_ . - ~` gets escaped.
const PERMALINK: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

pub fn encode_permalink(url: &str) -> String {
    utf8_percent_encode(url, PERMALINK).to_string()
}

/// Render the player markup for `url` with the styling in `options`.
pub fn embed_code(url: &str, options: &PostOptions) -> String {
    let size = options.size.unwrap_or(DEFAULT_SIZE).to_string();
    let values = [
        ("url", encode_permalink(url)),
        ("size", size),
        (
            "type",
            options
                .player_type
                .clone()
                .unwrap_or_else(|| DEFAULT_PLAYER_TYPE.to_string()),
        ),
        (
            "color",
            options
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        ),
    ];
    template::render(EMBED_CODE, &values)
}

#[derive(Deserialize, Debug, Default)]
struct Resolved {
    title: Option<String>,
    name: Option<String>,
    username: Option<String>,
    user: Option<ResolvedUser>,
}

#[derive(Deserialize, Debug)]
struct ResolvedUser {
    username: Option<String>,
}

/// What SoundCloud told us about a permalink, plus the derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    /// `user.username` of the uploader, when the entity has one.
    pub uploader: Option<String>,
    /// Normalized resolve response.
    pub raw: Value,
    /// Rendered player markup.
    pub code: String,
    pub full_title: String,
}

impl TrackMetadata {
    /// Build metadata from a resolve response body.
    pub fn from_response(body: &str, url: &str, options: &PostOptions) -> Result<Self> {
        let parsed: Value = serde_json::from_str(body).map_err(ResolveError::Malformed)?;
        if !parsed.is_object() {
            return Err(ResolveError::NotAnObject.into());
        }
        let raw = normalize_keys(parsed);
        let resolved: Resolved =
            serde_json::from_value(raw.clone()).map_err(ResolveError::Malformed)?;

        let uploader = resolved.user.and_then(|u| u.username);
        let base = resolved
            .title
            .clone()
            .or_else(|| resolved.name.clone())
            .or_else(|| resolved.username.clone())
            .ok_or(ResolveError::Untitled)?;
        let full_title = match &uploader {
            Some(by) => format!("{base} by {by}"),
            None => base,
        };

        Ok(TrackMetadata {
            title: resolved.title,
            name: resolved.name,
            username: resolved.username,
            uploader,
            raw,
            code: embed_code(url, options),
            full_title,
        })
    }
}

pub struct Resolver<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> Resolver<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Resolve `url` and derive the title and embed code.
    pub fn resolve(&self, url: &str, options: &PostOptions) -> Result<TrackMetadata> {
        let mut query = vec![("url", url)];
        if let Some(client_id) = options.client_id.as_deref() {
            query.push(("client_id", client_id));
        }

        let res = self
            .transport
            .get(RESOLVE_ENDPOINT, &query, "application/json")?;
        if !res.is_success() {
            return Err(ResolveError::Status {
                status: res.status,
                body: res.body,
            }
            .into());
        }

        let track = TrackMetadata::from_response(&res.body, url, options)?;
        info!(title = %track.full_title, "resolved SoundCloud permalink");
        debug!(raw = %track.raw, "resolve response");
        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::error::SoundlrousError;

    const URL: &str = "http://sc.example/x";

    #[test]
    fn test_full_title_with_uploader() {
        let track = TrackMetadata::from_response(
            r#"{"title":"Song","user":{"username":"bob"}}"#,
            URL,
            &PostOptions::defaults(),
        )
        .unwrap();
        assert_eq!(track.full_title, "Song by bob");
        assert_eq!(track.uploader.as_deref(), Some("bob"));
    }

    #[test]
    fn test_full_title_falls_back_to_username() {
        let track =
            TrackMetadata::from_response(r#"{"username":"bob"}"#, URL, &PostOptions::defaults())
                .unwrap();
        assert_eq!(track.full_title, "bob");
    }

    #[test]
    fn test_full_title_prefers_name_over_username() {
        let track = TrackMetadata::from_response(
            r#"{"name":"Mix","username":"bob"}"#,
            URL,
            &PostOptions::defaults(),
        )
        .unwrap();
        assert_eq!(track.full_title, "Mix");
    }

    #[test]
    fn test_untitled_entity_is_an_error() {
        let err = TrackMetadata::from_response(r#"{"id":1}"#, URL, &PostOptions::defaults())
            .unwrap_err();
        assert!(matches!(err, SoundlrousError::Resolve(ResolveError::Untitled)));
    }

    #[test]
    fn test_non_json_is_an_error() {
        let err = TrackMetadata::from_response("<html>", URL, &PostOptions::defaults())
            .unwrap_err();
        assert!(matches!(err, SoundlrousError::Resolve(ResolveError::Malformed(_))));
    }

    #[test]
    fn test_non_object_is_an_error() {
        let err = TrackMetadata::from_response(r#""just text""#, URL, &PostOptions::defaults())
            .unwrap_err();
        assert!(matches!(err, SoundlrousError::Resolve(ResolveError::NotAnObject)));
    }

    #[test]
    fn test_embed_code_encodes_url() {
        let code = embed_code(URL, &PostOptions::defaults());
        assert!(code.contains("url=http%3A%2F%2Fsc.example%2Fx&amp;auto_play=false"));
        assert!(!code.contains("url=http://sc.example/x"));
        assert!(code.contains("&amp;player_type=artwork&amp;color=ff6600"));
        assert!(code.contains(r#"height="425""#));
        assert!(!code.contains("&amp;amp;"));
    }

    #[test]
    fn test_embed_code_uses_styling() {
        let options = PostOptions {
            color: Some("0066cc".to_string()),
            size: Some(81),
            player_type: Some("tiny".to_string()),
            ..PostOptions::default()
        };
        let code = embed_code(URL, &options);
        assert!(code.contains(r#"width="81""#));
        assert!(code.contains("player_type=tiny"));
        assert!(code.contains("color=0066cc"));
        assert!(!code.contains('{'));
    }

    #[test]
    fn test_encode_permalink_keeps_unreserved() {
        assert_eq!(encode_permalink("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_permalink("a b&c"), "a%20b%26c");
    }

    #[test]
    fn test_resolve_sends_query_and_accept() {
        let transport = MockTransport::new();
        let options = PostOptions {
            client_id: Some("abc".to_string()),
            ..PostOptions::defaults()
        };
        let track = Resolver::new(&transport).resolve(URL, &options).unwrap();
        assert_eq!(track.full_title, "Song by bob");

        let gets = transport.gets();
        assert_eq!(gets.len(), 1);
        assert_eq!(gets[0].url, RESOLVE_ENDPOINT);
        assert_eq!(gets[0].accept, "application/json");
        assert_eq!(
            gets[0].query,
            vec![
                ("url".to_string(), URL.to_string()),
                ("client_id".to_string(), "abc".to_string())
            ]
        );
    }

    #[test]
    fn test_resolve_status_error() {
        let transport = MockTransport::new().with_resolve(404, r#"{"errors":[]}"#);
        let err = Resolver::new(&transport)
            .resolve(URL, &PostOptions::defaults())
            .unwrap_err();
        assert!(matches!(
            err,
            SoundlrousError::Resolve(ResolveError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn test_resolve_transport_error() {
        let transport = MockTransport::new().failing_get("connection refused");
        let err = Resolver::new(&transport)
            .resolve(URL, &PostOptions::defaults())
            .unwrap_err();
        assert!(matches!(err, SoundlrousError::Transport(_)));
    }
}
