//! Favorites collection
//!
//! An ordered list of saved artifacts, unique by source prompt.

use crate::models::Artifact;
use crate::{Error, Result};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Added,
    /// An artifact with the same source prompt was already saved; nothing changed.
    Duplicate,
}

#[derive(Debug, Clone, Default)]
pub struct FavoritesCollection {
    items: Vec<Artifact>,
}

impl FavoritesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, artifact: Artifact) -> FavoriteOutcome {
        if self.contains_prompt(&artifact.source_prompt) {
            info!("Already in favorites: {}", artifact.source_prompt);
            return FavoriteOutcome::Duplicate;
        }

        info!("Added {} to favorites ({} total)", artifact.id, self.items.len() + 1);
        self.items.push(artifact);
        FavoriteOutcome::Added
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Artifact> {
        if index >= self.items.len() {
            return Err(Error::Validation(format!(
                "No favorite at position {} ({} saved)",
                index,
                self.items.len()
            )));
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        info!("Cleared {} favorites", self.items.len());
        self.items.clear();
    }

    pub fn contains_prompt(&self, prompt: &str) -> bool {
        self.items.iter().any(|a| a.source_prompt == prompt)
    }

    pub fn get(&self, index: usize) -> Option<&Artifact> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneratedImage, StyleTag};

    fn artifact(prompt: &str) -> Artifact {
        Artifact::image(
            GeneratedImage {
                bytes: vec![1, 2, 3],
                mime_type: "image/png".to_string(),
            },
            prompt,
            StyleTag::Ecommerce,
            1,
        )
    }

    #[test]
    fn test_duplicate_prompt_is_idempotent() {
        let mut favorites = FavoritesCollection::new();

        assert_eq!(favorites.append(artifact("a lamp")), FavoriteOutcome::Added);
        // Different bytes, same prompt.
        assert_eq!(favorites.append(artifact("a lamp")), FavoriteOutcome::Duplicate);
        assert_eq!(favorites.len(), 1);
    }

    #[test]
    fn test_remove_at_shrinks_by_one_and_keeps_order() {
        let mut favorites = FavoritesCollection::new();
        for prompt in ["one", "two", "three"] {
            favorites.append(artifact(prompt));
        }

        let removed = favorites.remove_at(1).unwrap();

        assert_eq!(removed.source_prompt, "two");
        assert_eq!(favorites.len(), 2);
        let prompts: Vec<_> = favorites.iter().map(|a| a.source_prompt.as_str()).collect();
        assert_eq!(prompts, vec!["one", "three"]);
    }

    #[test]
    fn test_remove_out_of_range_is_validation_error() {
        let mut favorites = FavoritesCollection::new();
        favorites.append(artifact("only"));

        assert!(matches!(favorites.remove_at(1), Err(Error::Validation(_))));
        assert_eq!(favorites.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut favorites = FavoritesCollection::new();
        favorites.append(artifact("a"));
        favorites.append(artifact("b"));

        favorites.clear();
        assert!(favorites.is_empty());
        assert!(favorites.get(0).is_none());
    }
}
