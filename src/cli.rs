// Command line
// ------------
// Flag definitions only. Turning them into `PostOptions` is the one bit of
// logic here: anything not given stays `None` so it cannot shadow a value
// from the config file.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use reqwest::Url;

use crate::logging::LogFormat;
use crate::options::PostOptions;

/// Embed SoundCloud players on Tumblr and/or Posterous.
#[derive(Parser, Debug, Default)]
#[command(
    name = "soundlrous",
    version,
    about,
    after_help = "URL - Permalink for embeddable object\n\nThe password is saved under the config key `passw`; `password` is read too."
)]
pub struct Cli {
    /// Permalink for the SoundCloud track or user
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Email address for your account
    #[arg(short, long)]
    pub email: Option<String>,

    /// Password for your account
    #[arg(short, long)]
    pub password: Option<String>,

    /// Name of service: tumblr or posterous
    #[arg(short, long, value_name = "NAME")]
    pub service: Option<String>,

    /// Color in hexadecimal RGB
    #[arg(short, long, value_name = "HEX")]
    pub color: Option<String>,

    /// Size in pixels
    #[arg(short = 'z', long, value_name = "PIXELS")]
    pub size: Option<u32>,

    /// Type of player
    #[arg(short = 'y', long = "type", value_name = "TYPE")]
    pub player_type: Option<String>,

    /// Title for the post, may contain interpolated template strings
    #[arg(short, long, value_name = "STRING")]
    pub title: Option<String>,

    /// Body for the post, may contain interpolated template strings
    #[arg(short, long, value_name = "STRING")]
    pub body: Option<String>,

    /// Comma separated tags for the post
    #[arg(long)]
    pub tags: Option<String>,

    /// Tumblr post type (defaults to regular)
    #[arg(long, value_name = "TYPE")]
    pub post_type: Option<String>,

    /// SoundCloud API client id for the resolve call
    /// (falls back to $SOUNDLROUS_CLIENT_ID, which is never saved)
    #[arg(long, value_name = "ID")]
    pub client_id: Option<String>,

    /// Write arguments to defaults
    #[arg(short, long)]
    pub write: bool,

    /// Config file (default: ~/.soundlrous)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Resolve and print the request instead of posting it
    #[arg(long)]
    pub dry_run: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Options given on the command line. A URL that is not http(s) is
    /// dropped, which later reports it as missing.
    pub fn to_options(&self) -> PostOptions {
        PostOptions {
            url: self.url.as_deref().filter(|u| is_http_url(u)).map(str::to_string),
            title: self.title.clone(),
            body: self.body.clone(),
            color: self.color.clone(),
            size: self.size,
            player_type: self.player_type.clone(),
            tags: self.tags.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            service: self.service.as_deref().map(str::to_lowercase),
            save: self.write.then_some(true),
            post_type: self.post_type.clone(),
            client_id: self.client_id.clone(),
            extra: Default::default(),
        }
    }

    /// Rendered help text, printed when required arguments are missing.
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}

fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "soundlrous",
            "-e",
            "me@example.com",
            "-p",
            "hunter2",
            "-s",
            "Tumblr",
            "-c",
            "0066cc",
            "-z",
            "81",
            "-y",
            "tiny",
            "-t",
            "Now playing: {soundcloud::full_title}",
            "-b",
            "{soundcloud::code}",
            "-w",
            "http://soundcloud.com/bob/song",
        ])
        .unwrap();
        let options = cli.to_options();
        assert_eq!(options.email.as_deref(), Some("me@example.com"));
        assert_eq!(options.password.as_deref(), Some("hunter2"));
        assert_eq!(options.service.as_deref(), Some("tumblr"));
        assert_eq!(options.color.as_deref(), Some("0066cc"));
        assert_eq!(options.size, Some(81));
        assert_eq!(options.player_type.as_deref(), Some("tiny"));
        assert_eq!(options.body.as_deref(), Some("{soundcloud::code}"));
        assert_eq!(options.save, Some(true));
        assert_eq!(options.url.as_deref(), Some("http://soundcloud.com/bob/song"));
    }

    #[test]
    fn test_unset_flags_stay_none() {
        let cli = Cli::try_parse_from(["soundlrous"]).unwrap();
        let options = cli.to_options();
        assert_eq!(options.save, None);
        assert_eq!(options.url, None);
        assert_eq!(options.color, None);
    }

    #[test]
    fn test_non_http_url_is_dropped() {
        let cli = Cli::try_parse_from(["soundlrous", "ftp://example.com/x"]).unwrap();
        assert_eq!(cli.to_options().url, None);
        let cli = Cli::try_parse_from(["soundlrous", "not a url"]).unwrap();
        assert_eq!(cli.to_options().url, None);
        let cli = Cli::try_parse_from(["soundlrous", "https://soundcloud.com/x"]).unwrap();
        assert!(cli.to_options().url.is_some());
    }

    #[test]
    fn test_size_must_be_integer() {
        assert!(Cli::try_parse_from(["soundlrous", "-z", "big"]).is_err());
    }

    #[test]
    fn test_usage_mentions_flags() {
        let usage = Cli::usage();
        assert!(usage.contains("--email"));
        assert!(usage.contains("--write"));
        assert!(usage.contains("URL"));
    }
}
