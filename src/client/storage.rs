use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::client::ClientError;

/// Where a session keeps its bearer token between runs.
#[async_trait]
pub trait TokenStorage: Send {
    async fn load(&mut self) -> Result<Option<String>, ClientError>;
    async fn save(&mut self, token: &str) -> Result<(), ClientError>;
    async fn clear(&mut self) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Option<String>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn peek(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&mut self) -> Result<Option<String>, ClientError> {
        Ok(self.token.clone())
    }

    async fn save(&mut self, token: &str) -> Result<(), ClientError> {
        self.token = Some(token.to_string());
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), ClientError> {
        self.token = None;
        Ok(())
    }
}

/// Token kept in a single file; a missing or empty file means no session.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&mut self) -> Result<Option<String>, ClientError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Storage(format!(
                "Failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&mut self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ClientError::Storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&self.path, token).await.map_err(|e| {
            ClientError::Storage(format!("Failed to write {}: {e}", self.path.display()))
        })
    }

    async fn clear(&mut self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}
