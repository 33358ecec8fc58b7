// SPDX-License-Identifier: MPL-2.0

use crate::api::{BoardClient, Category, CategoryTree, ClientError, NewCategory};
use thiserror::Error;

/// Separator between ancestor names in a select label
pub const PATH_SEPARATOR: &str = " › ";

#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("category name is empty")]
    EmptyName,
    #[error("category slug is empty")]
    EmptySlug,
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Entry of a category picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: i64,
    pub label: String,
}

/// Depth-first listing of the tree, each label carrying its full path.
pub fn flatten_for_select(nodes: &[CategoryTree]) -> Vec<SelectOption> {
    fn walk(nodes: &[CategoryTree], path: &mut Vec<String>, out: &mut Vec<SelectOption>) {
        for node in nodes {
            path.push(node.name.clone());
            out.push(SelectOption {
                id: node.id,
                label: path.join(PATH_SEPARATOR),
            });
            walk(&node.children, path, out);
            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(nodes, &mut Vec::new(), &mut out);
    out
}

/// Flat category list plus the server-built tree.
#[derive(Debug, Clone, Default)]
pub struct CategoryStore {
    categories: Vec<Category>,
    tree: Vec<CategoryTree>,
    error: Option<String>,
}

impl CategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn tree(&self) -> &[CategoryTree] {
        &self.tree
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    fn remember<T>(&mut self, result: Result<T, ClientError>) -> Result<T, CategoryError> {
        result.map_err(|e| {
            tracing::warn!(error = %e, "category request failed");
            self.error = Some(e.to_string());
            CategoryError::Client(e)
        })
    }

    pub async fn load(&mut self, client: &BoardClient) -> Result<(), CategoryError> {
        let categories = client.get_categories().await;
        let categories = self.remember(categories)?;
        let tree = client.get_category_tree().await;
        let tree = self.remember(tree)?;

        self.categories = categories;
        self.tree = tree;
        self.error = None;
        tracing::debug!(count = self.categories.len(), "categories loaded");
        Ok(())
    }

    /// Create a category. The slug is stored lowercase.
    pub async fn add(
        &mut self,
        client: &BoardClient,
        name: &str,
        slug: &str,
        parent_id: Option<i64>,
    ) -> Result<Category, CategoryError> {
        let request = new_category(name, slug, parent_id)?;
        let created = client.create_category(&request).await;
        let created = self.remember(created)?;
        self.categories.push(created.clone());
        Ok(created)
    }

    /// Delete a category and reload both lists, since children move with it.
    pub async fn delete(&mut self, client: &BoardClient, id: i64) -> Result<(), CategoryError> {
        let deleted = client.delete_category(id).await;
        self.remember(deleted)?;
        self.load(client).await
    }
}

fn new_category<'a>(
    name: &'a str,
    slug: &str,
    parent_id: Option<i64>,
) -> Result<NewCategory<'a>, CategoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CategoryError::EmptyName);
    }
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(CategoryError::EmptySlug);
    }
    Ok(NewCategory {
        name,
        slug: slug.to_lowercase(),
        parent_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, name: &str, children: Vec<CategoryTree>) -> CategoryTree {
        CategoryTree {
            id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            parent_id: None,
            children,
        }
    }

    #[test]
    fn test_flatten_builds_paths() {
        let tree = vec![
            node(
                1,
                "Politics",
                vec![node(2, "Domestic", vec![node(3, "Tax", vec![])]), node(4, "World", vec![])],
            ),
            node(5, "Sports", vec![]),
        ];

        let options = flatten_for_select(&tree);
        let labels: Vec<(i64, &str)> = options.iter().map(|o| (o.id, o.label.as_str())).collect();
        assert_eq!(
            labels,
            vec![
                (1, "Politics"),
                (2, "Politics › Domestic"),
                (3, "Politics › Domestic › Tax"),
                (4, "Politics › World"),
                (5, "Sports"),
            ]
        );
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten_for_select(&[]).is_empty());
    }

    #[test]
    fn test_new_category_lowercases_slug() {
        let request = new_category(" Movies ", "Sci-Fi", Some(3)).unwrap();
        assert_eq!(request.name, "Movies");
        assert_eq!(request.slug, "sci-fi");
        assert_eq!(request.parent_id, Some(3));
    }

    #[test]
    fn test_new_category_rejects_blank_fields() {
        assert!(matches!(
            new_category("  ", "x", None),
            Err(CategoryError::EmptyName)
        ));
        assert!(matches!(
            new_category("x", "", None),
            Err(CategoryError::EmptySlug)
        ));
    }

    #[test]
    fn test_find_by_slug() {
        let mut store = CategoryStore::new();
        store.categories.push(Category {
            id: 9,
            name: "Music".to_string(),
            slug: "music".to_string(),
            parent_id: None,
        });
        assert_eq!(store.find_by_slug("music").map(|c| c.id), Some(9));
        assert!(store.find_by_slug("art").is_none());
    }
}
