use tracing::info;

use crate::{
    api::RelayApi,
    error::EditorError,
    models::FileEntry,
    session::Credential,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorDraft {
    file_id: Option<String>,
    pub file_name: String,
    pub content: String,
}

impl EditorDraft {
    pub fn new_file() -> Self {
        Self::default()
    }

    pub async fn open(
        relay: &dyn RelayApi,
        credential: Option<&Credential>,
        file_id: &str,
    ) -> Result<Self, EditorError> {
        let content = relay.read_file(credential, file_id).await?;
        Ok(Self {
            file_id: Some(file_id.to_string()),
            file_name: String::new(),
            content,
        })
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn is_new(&self) -> bool {
        self.file_id.is_none()
    }

    /// Creates the file on first save, updates its content afterwards.
    pub async fn save(
        &mut self,
        relay: &dyn RelayApi,
        credential: Option<&Credential>,
    ) -> Result<FileEntry, EditorError> {
        let entry = match self.file_id.as_deref() {
            Some(file_id) => relay.update_file(credential, file_id, &self.content).await?,
            None => {
                let name = self.file_name.trim();
                if name.is_empty() {
                    return Err(EditorError::MissingFileName);
                }
                let entry = relay.create_file(credential, name, &self.content).await?;
                info!(file_id = %entry.id, "created file from editor");
                self.file_id = Some(entry.id.clone());
                self.file_name = entry.name.clone();
                entry
            }
        };
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeRelay;

    #[tokio::test]
    async fn new_file_needs_a_name() {
        let relay = FakeRelay::new();
        let mut draft = EditorDraft::new_file();
        draft.file_name = "   ".into();
        draft.content = "hello".into();

        let err = draft.save(&relay, None).await.unwrap_err();
        assert!(matches!(err, EditorError::MissingFileName));
        assert!(draft.is_new());
    }

    #[tokio::test]
    async fn first_save_creates_with_trimmed_name() {
        let relay = FakeRelay::new();
        let mut draft = EditorDraft::new_file();
        draft.file_name = "  notes.txt ".into();

        let entry = draft.save(&relay, None).await.unwrap();
        assert_eq!(entry.name, "notes.txt");
        assert_eq!(draft.file_id(), Some(entry.id.as_str()));
        assert_eq!(relay.read_file(None, &entry.id).await.unwrap(), "");
    }

    #[tokio::test]
    async fn edit_round_trip() {
        let relay = FakeRelay::new();
        let mut draft = EditorDraft::new_file();
        draft.file_name = "greeting.txt".into();
        draft.content = "hello".into();
        let created = draft.save(&relay, None).await.unwrap();

        let mut reopened = EditorDraft::open(&relay, None, &created.id).await.unwrap();
        assert_eq!(reopened.content, "hello");
        assert!(!reopened.is_new());

        reopened.content = "world".into();
        let updated = reopened.save(&relay, None).await.unwrap();
        assert_eq!(updated.id, created.id);

        let again = EditorDraft::open(&relay, None, &created.id).await.unwrap();
        assert_eq!(again.content, "world");
    }

    #[tokio::test]
    async fn opening_missing_file_fails() {
        let relay = FakeRelay::new();
        let err = EditorDraft::open(&relay, None, "nope").await.unwrap_err();
        assert!(matches!(err, EditorError::Client(_)));
    }
}
