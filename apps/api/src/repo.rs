//! Résumé storage seam. The extraction and ranking core never touches
//! storage directly; handlers go through this trait, so the in-memory
//! implementation can be swapped for a durable one without touching the
//! core.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::resume::StoredResume;

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn save(&self, resume: StoredResume) -> Result<()>;
    /// Returns a snapshot in insertion order. Ranking relies on this
    /// order as its tie-break, so it must be stable.
    async fn list(&self) -> Result<Vec<StoredResume>>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredResume>>;
    /// Returns true if an entry was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[derive(Default)]
pub struct InMemoryRepository {
    entries: RwLock<Vec<StoredResume>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeRepository for InMemoryRepository {
    async fn save(&self, resume: StoredResume) -> Result<()> {
        self.entries.write().await.push(resume);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredResume>> {
        Ok(self.entries.read().await.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredResume>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|r| r.id != id);
        Ok(entries.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;
    use chrono::Utc;

    fn make_resume(filename: &str) -> StoredResume {
        StoredResume {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            uploaded_at: Utc::now(),
            record: extract::analyze("Jane Doe\nSoftware Engineer with Python"),
            embedding: vec![0.0; 100],
            embedder: "lexical".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get_by_id() {
        let repo = InMemoryRepository::new();
        let resume = make_resume("a.txt");
        let id = resume.id;
        repo.save(resume).await.unwrap();

        let found = repo.get_by_id(id).await.unwrap();
        assert_eq!(found.unwrap().filename, "a.txt");
        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let repo = InMemoryRepository::new();
        for name in ["first.txt", "second.txt", "third.txt"] {
            repo.save(make_resume(name)).await.unwrap();
        }
        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.filename)
            .collect();
        assert_eq!(names, vec!["first.txt", "second.txt", "third.txt"]);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let repo = InMemoryRepository::new();
        let resume = make_resume("a.txt");
        let id = resume.id;
        repo.save(resume).await.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
