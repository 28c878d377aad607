use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tmap_store::DirTmapStore;

use crate::client::TmapClient;
use crate::error::{TmapError, TmapResult};

/// Client settings, usually read from a `tmap.toml` file.
///
/// ```toml
/// store_root = "/var/lib/tmap"
/// default_object = "foo"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Directory holding object files for [`DirTmapStore`].
    pub store_root: PathBuf,
    /// Object used when a command does not name one.
    pub default_object: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from(".tmap"),
            default_object: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> TmapResult<Self> {
        toml::from_str(s).map_err(|e| TmapError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> TmapResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TmapError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> TmapResult<String> {
        toml::to_string(self).map_err(|e| TmapError::Config(e.to_string()))
    }

    /// Pick `explicit` if given, else the configured default object.
    pub fn object<'a>(&'a self, explicit: Option<&'a str>) -> TmapResult<&'a str> {
        explicit
            .or(self.default_object.as_deref())
            .ok_or_else(|| TmapError::Config("no object given and no default_object set".into()))
    }

    /// Open a client on a directory store at `store_root`.
    pub fn open_dir_client(&self) -> TmapResult<TmapClient<DirTmapStore>> {
        let store = DirTmapStore::open(&self.store_root).map_err(|source| TmapError::Open {
            root: self.store_root.clone(),
            source,
        })?;
        Ok(TmapClient::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ClientConfig::default();
        assert_eq!(c.store_root, PathBuf::from(".tmap"));
        assert!(c.default_object.is_none());
    }

    #[test]
    fn parse_full_config() {
        let c = ClientConfig::from_toml_str(
            r#"
            store_root = "/srv/tmap"
            default_object = "foo"
            "#,
        )
        .unwrap();
        assert_eq!(c.store_root, PathBuf::from("/srv/tmap"));
        assert_eq!(c.default_object.as_deref(), Some("foo"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let c = ClientConfig::from_toml_str("default_object = \"bar\"").unwrap();
        assert_eq!(c.store_root, PathBuf::from(".tmap"));
    }

    #[test]
    fn unknown_field_rejected() {
        let err = ClientConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, TmapError::Config(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let c = ClientConfig {
            store_root: "data".into(),
            default_object: Some("foo".into()),
        };
        let text = c.to_toml_string().unwrap();
        assert_eq!(ClientConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn object_selection() {
        let mut c = ClientConfig::default();
        assert!(c.object(None).is_err());
        assert_eq!(c.object(Some("x")).unwrap(), "x");
        c.default_object = Some("foo".into());
        assert_eq!(c.object(None).unwrap(), "foo");
        assert_eq!(c.object(Some("x")).unwrap(), "x");
    }

    #[test]
    fn load_and_open_dir_client() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("objects");
        let path = dir.path().join("tmap.toml");
        std::fs::write(
            &path,
            format!("store_root = {:?}\ndefault_object = \"foo\"\n", root.display().to_string()),
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        let client = config.open_dir_client().unwrap();
        client.create("foo", b"").unwrap();
        client.set_str("foo", "key1", "val1").unwrap();
        assert_eq!(client.read_key("foo", "key1"), "val1");
        assert!(root.is_dir());
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = ClientConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, TmapError::Config(_)));
    }
}
