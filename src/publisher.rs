// Publishers
// ----------
// One variant per blogging service. Both share the same preparation step
// (resolve the permalink, fill in the title and body templates) and differ
// only in endpoint, default fields and how credentials travel.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{info, warn};

use crate::api::{BasicAuth, FormRequest, HttpResponse, Transport};
use crate::error::{Result, SoundlrousError};
use crate::options::{PostOptions, DEFAULT_TITLE};
use crate::soundcloud::Resolver;
use crate::template;

pub const TUMBLR_ENDPOINT: &str = "http://www.tumblr.com/api/write";
pub const POSTEROUS_ENDPOINT: &str = "http://posterous.com/api/newpost";

/// Placeholder for the rendered player markup in the body template.
pub const CODE_PLACEHOLDER: &str = "soundcloud::code";
/// Placeholder for the track title in the title template.
pub const TITLE_PLACEHOLDER: &str = "soundcloud::full_title";

/// Body used when the options carry no body template at all.
const BARE_BODY: &str = "{soundcloud::code}";

/// Form fields a caller may never set; they carry the account credentials.
const RESERVED_FIELDS: [&str; 2] = ["email", "password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Tumblr,
    Posterous,
}

impl ServiceKind {
    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Tumblr => "tumblr",
            ServiceKind::Posterous => "posterous",
        }
    }

    pub fn publisher(self, credentials: Credentials) -> Publisher {
        match self {
            ServiceKind::Tumblr => Publisher::Tumblr(credentials),
            ServiceKind::Posterous => Publisher::Posterous(credentials),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps service names to publishers. Built once at startup and handed to
/// the driver.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: BTreeMap<&'static str, ServiceKind>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry {
    /// Registry with every supported service.
    pub fn new() -> Self {
        let mut registry = Self {
            services: BTreeMap::new(),
        };
        registry.register(ServiceKind::Tumblr);
        registry.register(ServiceKind::Posterous);
        registry
    }

    pub fn register(&mut self, kind: ServiceKind) {
        self.services.insert(kind.name(), kind);
    }

    /// Look a service up by name, ignoring case.
    pub fn lookup(&self, name: &str) -> Result<ServiceKind> {
        let key = name.trim().to_lowercase();
        self.services
            .get(key.as_str())
            .copied()
            .ok_or_else(|| SoundlrousError::UnknownService {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Registered names, comma separated.
    pub fn names(&self) -> String {
        self.services.keys().copied().collect::<Vec<_>>().join(", ")
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

/// Outcome of `Publisher::post`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The request went out; this is what the service answered.
    Sent(HttpResponse),
    /// Dry run: the request that would have been sent.
    DryRun(FormRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publisher {
    Tumblr(Credentials),
    Posterous(Credentials),
}

impl Publisher {
    pub fn kind(&self) -> ServiceKind {
        match self {
            Publisher::Tumblr(_) => ServiceKind::Tumblr,
            Publisher::Posterous(_) => ServiceKind::Posterous,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Publisher::Tumblr(_) => TUMBLR_ENDPOINT,
            Publisher::Posterous(_) => POSTEROUS_ENDPOINT,
        }
    }

    /// Build the form request for already prepared options.
    ///
    /// Precedence, lowest first: service defaults, caller options,
    /// credentials. Callers can override defaults like Tumblr's
    /// `type=regular` but never the account fields.
    pub fn build_request(&self, options: &PostOptions) -> FormRequest {
        let mut caller = options.post_fields();
        caller.retain(|(key, _)| {
            let reserved = RESERVED_FIELDS.contains(&key.as_str());
            if reserved {
                warn!(field = %key, "ignoring option that would overwrite credentials");
            }
            !reserved
        });

        match self {
            Publisher::Tumblr(credentials) => {
                let defaults = vec![("type".to_string(), "regular".to_string())];
                if let Some(post_type) = &options.post_type {
                    caller.push(("type".to_string(), post_type.clone()));
                }
                let auth = vec![
                    ("email".to_string(), credentials.email.clone()),
                    ("password".to_string(), credentials.password.clone()),
                ];
                FormRequest {
                    endpoint: self.endpoint().to_string(),
                    fields: layer(&[defaults, caller, auth]),
                    basic_auth: None,
                }
            }
            Publisher::Posterous(credentials) => FormRequest {
                endpoint: self.endpoint().to_string(),
                fields: layer(&[caller]),
                basic_auth: Some(BasicAuth {
                    username: credentials.email.clone(),
                    password: credentials.password.clone(),
                }),
            },
        }
    }

    /// Resolve, fill in the templates and submit the post.
    ///
    /// With `dry_run` the request is built but not sent. The resolve call
    /// still happens.
    pub fn post<T: Transport + ?Sized>(
        &self,
        transport: &T,
        options: &PostOptions,
        dry_run: bool,
    ) -> Result<Delivery> {
        let prepared = prepare(&Resolver::new(transport), options)?;
        let request = self.build_request(&prepared);

        if dry_run {
            info!(service = %self.kind(), endpoint = %request.endpoint, "dry run, not posting");
            return Ok(Delivery::DryRun(request));
        }

        let response = transport.post_form(&request)?;
        if response.is_success() {
            info!(service = %self.kind(), status = response.status, "posted");
        } else {
            warn!(service = %self.kind(), status = response.status, "service rejected the post");
        }
        Ok(Delivery::Sent(response))
    }
}

/// Resolve `options.url` and substitute the SoundCloud placeholders into
/// the title and body templates. Single pass, no recursion.
pub fn prepare<T: Transport + ?Sized>(
    resolver: &Resolver<'_, T>,
    options: &PostOptions,
) -> Result<PostOptions> {
    let url = options
        .url
        .as_deref()
        .ok_or_else(|| SoundlrousError::MissingArgument("url".to_string()))?;
    let track = resolver.resolve(url, options)?;

    let body = template::render(
        options.body.as_deref().unwrap_or(BARE_BODY),
        &[(CODE_PLACEHOLDER, track.code.as_str())],
    );
    let title = template::render(
        options.title.as_deref().unwrap_or(DEFAULT_TITLE),
        &[(TITLE_PLACEHOLDER, track.full_title.as_str())],
    );

    Ok(PostOptions {
        title: Some(title),
        body: Some(body),
        ..options.clone()
    })
}

/// Flatten parameter layers; a later layer replaces an earlier value for
/// the same key in place, keeping first-seen order.
fn layer(layers: &[Vec<(String, String)>]) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for (key, value) in layers.iter().flatten() {
        match out.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value.clone(),
            None => out.push((key.clone(), value.clone())),
        }
    }
    out
}
