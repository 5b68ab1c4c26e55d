use std::fmt;

use url::Url;

pub type JobId = u64;

/// Longest accepted output name, in bytes.
const MAX_NAME_BYTES: usize = 80;

/// One scrape invocation: a source article URL plus the name of the staging
/// subdirectory the collaborator writes its tables into.
///
/// Both fields are validated on construction, so a `JobSpec` in hand is
/// always safe to pass to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    url: String,
    output_name: String,
}

impl JobSpec {
    pub fn new(
        url: impl Into<String>,
        output_name: impl Into<String>,
    ) -> Result<Self, JobSpecError> {
        let url = url.into();
        let output_name = output_name.into();
        validate_url(&url)?;
        validate_output_name(&output_name)?;
        Ok(Self { url, output_name })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSpecError {
    EmptyName,
    NameTooLong { len: usize },
    ForbiddenCharacter { ch: char },
    PaddedName { name: String },
    RelativeComponent { name: String },
    ReservedName { name: String },
    InvalidUrl { reason: String },
    UnsupportedScheme { scheme: String },
}

impl fmt::Display for JobSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSpecError::EmptyName => write!(f, "output name is empty"),
            JobSpecError::NameTooLong { len } => {
                write!(f, "output name is {len} bytes (max {MAX_NAME_BYTES})")
            }
            JobSpecError::ForbiddenCharacter { ch } => {
                write!(f, "output name contains forbidden character {ch:?}")
            }
            JobSpecError::PaddedName { name } => {
                write!(f, "output name `{name}` starts or ends with a dot or space")
            }
            JobSpecError::RelativeComponent { name } => {
                write!(f, "output name `{name}` is a relative path component")
            }
            JobSpecError::ReservedName { name } => {
                write!(f, "output name `{name}` is a reserved device name")
            }
            JobSpecError::InvalidUrl { reason } => write!(f, "invalid url: {reason}"),
            JobSpecError::UnsupportedScheme { scheme } => {
                write!(f, "unsupported url scheme `{scheme}`")
            }
        }
    }
}

impl std::error::Error for JobSpecError {}

fn validate_url(raw: &str) -> Result<(), JobSpecError> {
    let parsed = Url::parse(raw).map_err(|err| JobSpecError::InvalidUrl {
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(JobSpecError::UnsupportedScheme {
            scheme: other.to_string(),
        }),
    }
}

/// Checks that a name is usable as a single directory component on every
/// platform we stage output on. Unlike a sanitizer, this rejects instead of
/// rewriting: the name is the consolidation key and must round-trip exactly.
pub fn validate_output_name(name: &str) -> Result<(), JobSpecError> {
    if name.is_empty() {
        return Err(JobSpecError::EmptyName);
    }
    if name == "." || name == ".." {
        return Err(JobSpecError::RelativeComponent {
            name: name.to_string(),
        });
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(JobSpecError::NameTooLong { len: name.len() });
    }
    if let Some(ch) = name.chars().find(|c| is_forbidden(*c)) {
        return Err(JobSpecError::ForbiddenCharacter { ch });
    }
    if name.starts_with([' ', '.']) || name.ends_with([' ', '.']) {
        return Err(JobSpecError::PaddedName {
            name: name.to_string(),
        });
    }
    if is_reserved_windows_name(name) {
        return Err(JobSpecError::ReservedName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
