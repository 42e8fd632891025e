use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// The maximum allowed length for a [`ContainerID`].
const CONTAINER_ID_MAX_LEN: usize = 255;

/// Length of the short id form used in log output.
const SHORT_ID_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid container id: {0}")]
    InvalidContainerID(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A validated container identifier as handed out by the container runtime.
///
/// Only non-empty lowercase alphanumeric ids up to [`CONTAINER_ID_MAX_LEN`]
/// characters are accepted, which is the shape of every id the libpod API
/// produces.
///
/// # Examples
///
/// ```
/// # use opensearch_satellite::container::ContainerID;
/// let id = ContainerID::new("abc123abc123abc123").unwrap();
/// assert_eq!(id.short(), "abc123abc123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerID(Arc<str>);

impl ContainerID {
    /// Creates a new `ContainerID` from the given raw id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContainerID`] if the input is empty, exceeds
    /// [`CONTAINER_ID_MAX_LEN`], or contains anything other than lowercase
    /// alphanumeric ASCII.
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if src.is_empty()
            || src.len() > CONTAINER_ID_MAX_LEN
            || !is_lowercase_alpha_numeric(src.as_bytes())
        {
            return Err(Error::InvalidContainerID(src.to_owned()));
        }

        Ok(Self(src.into()))
    }

    /// The first [`SHORT_ID_LEN`] characters, the familiar abbreviated form.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(SHORT_ID_LEN)]
    }

    pub fn to_arc(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

impl AsRef<str> for ContainerID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContainerID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A container observed by one discovery poll.
///
/// The name is captured once and kept for the lifetime of the container's
/// stream worker, even if the runtime later reports a different name for the
/// same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: ContainerID,
    pub name: String,
}

impl ContainerRef {
    /// Builds a ref from the runtime's raw name list.
    ///
    /// The first entry is used with a single leading `/` stripped; a container
    /// without any name falls back to the short form of its id.
    pub fn new(id: ContainerID, names: &[String]) -> Self {
        let name = names
            .first()
            .map(|name| name.strip_prefix('/').unwrap_or(name).to_owned())
            .unwrap_or_else(|| id.short().to_owned());

        Self { id, name }
    }
}

/// Checks whether all bytes are lowercase alphanumeric ASCII.
fn is_lowercase_alpha_numeric(src: &[u8]) -> bool {
    src.iter()
        .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}
