//! Per-zone device credential stores.
//!
//! Each zone provisions its managed device through a `<ZONE>.conf` JSON
//! file in the configured credential directory. A missing file is not an
//! error: it marks the zone as having no device on the platform.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use thermobridge_domain::zone::ZoneId;

use crate::error::IotError;

/// Contents of a `<ZONE>.conf` credential store.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCredentials {
    /// Platform endpoint id of the provisioned device.
    #[serde(rename = "endpointId")]
    pub endpoint_id: String,
    /// Shared secret used as the device's API password.
    #[serde(rename = "sharedSecret")]
    pub shared_secret: String,
}

/// Path of the credential store for a zone.
pub(crate) fn store_path(dir: &Path, zone: &ZoneId) -> PathBuf {
    dir.join(format!("{zone}.conf"))
}

/// Load a zone's credential store.
///
/// Returns `Ok(None)` when the file does not exist and an error for any
/// other read or parse failure.
pub(crate) async fn load(
    dir: &Path,
    zone: &ZoneId,
) -> Result<Option<DeviceCredentials>, IotError> {
    let path = store_path(dir, zone);
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(IotError::Io(err)),
    };
    let credentials = serde_json::from_str(&raw).map_err(IotError::CredentialParse)?;
    Ok(Some(credentials))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_derive_store_path_from_zone_id() {
        let path = store_path(Path::new("/etc/thermobridge"), &ZoneId::new("lobby"));
        assert_eq!(path, PathBuf::from("/etc/thermobridge/LOBBY.conf"));
    }

    #[test]
    fn should_parse_credential_store() {
        let credentials: DeviceCredentials = serde_json::from_str(
            r#"{"endpointId": "AAAA-BBBB", "sharedSecret": "s3cret"}"#,
        )
        .unwrap();
        assert_eq!(credentials.endpoint_id, "AAAA-BBBB");
        assert_eq!(credentials.shared_secret, "s3cret");
    }

    #[tokio::test]
    async fn should_report_missing_store_as_none() {
        let loaded = load(Path::new("/nonexistent-thermobridge-dir"), &ZoneId::new("lobby"))
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("thermobridge-{}-{tag}", std::process::id()))
    }

    #[tokio::test]
    async fn should_load_store_from_directory() {
        let dir = scratch_dir("cred-ok");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(
            dir.join("LOBBY.conf"),
            r#"{"endpointId": "AAAA-BBBB", "sharedSecret": "s3cret"}"#,
        )
        .await
        .unwrap();

        let loaded = load(&dir, &ZoneId::new("lobby")).await.unwrap().unwrap();
        assert_eq!(loaded.endpoint_id, "AAAA-BBBB");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn should_error_on_malformed_store() {
        let dir = scratch_dir("cred-bad");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("BAR.conf"), "not json").await.unwrap();

        let err = load(&dir, &ZoneId::new("bar")).await.unwrap_err();
        assert!(matches!(err, IotError::CredentialParse(_)));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
