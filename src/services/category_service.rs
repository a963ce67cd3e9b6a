use std::collections::HashSet;

use crate::{error::Result, models::PublicationStatus, services::ContentStore};

/// Branches deeper than this are not expanded.
pub const MAX_SUBTREE_DEPTH: usize = 32;

/// Collect `root` and every descendant category slug, in pre-order.
///
/// One store query per visited category, issued sequentially. Slugs already
/// collected are not visited again, so malformed parent links cannot loop.
pub async fn resolve_subtree(
    store: &dyn ContentStore,
    root: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Vec<String>> {
    let mut slugs = Vec::new();
    let mut visited: HashSet<String> = HashSet::from([root.to_string()]);
    let mut stack: Vec<(String, usize)> = vec![(root.to_string(), 0)];

    while let Some((slug, depth)) = stack.pop() {
        if depth >= MAX_SUBTREE_DEPTH {
            tracing::warn!(%slug, depth, "Category subtree too deep, not expanding");
            slugs.push(slug);
            continue;
        }

        let children = store.child_category_slugs(&slug, locale, status).await?;
        slugs.push(slug);

        for child in children.into_iter().rev() {
            if visited.insert(child.clone()) {
                stack.push((child, depth + 1));
            } else {
                tracing::warn!(%child, "Category visited twice, parent links form a cycle");
            }
        }
    }

    Ok(slugs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::{
        error::AppError,
        models::{InquiryWithAttachments, NewInquiry, Subscriber},
        services::upload_service::StoredUpload,
    };

    struct TreeStore {
        children: HashMap<String, Vec<String>>,
        queries: Arc<Mutex<Vec<(String, String)>>>,
        fail_on: Option<String>,
    }

    impl TreeStore {
        fn new(edges: &[(&str, &str)]) -> Self {
            let mut children: HashMap<String, Vec<String>> = HashMap::new();
            for (parent, child) in edges {
                children
                    .entry(parent.to_string())
                    .or_default()
                    .push(child.to_string());
            }
            Self {
                children,
                queries: Arc::new(Mutex::new(Vec::new())),
                fail_on: None,
            }
        }
    }

    #[async_trait]
    impl ContentStore for TreeStore {
        async fn child_category_slugs(
            &self,
            parent_slug: &str,
            locale: &str,
            _status: PublicationStatus,
        ) -> Result<Vec<String>> {
            self.queries
                .lock()
                .await
                .push((parent_slug.to_string(), locale.to_string()));
            if self.fail_on.as_deref() == Some(parent_slug) {
                return Err(AppError::InternalError("store unavailable".to_string()));
            }
            Ok(self.children.get(parent_slug).cloned().unwrap_or_default())
        }

        async fn find_subscriber(&self, _email: &str) -> Result<Option<Subscriber>> {
            unimplemented!()
        }

        async fn create_subscriber(&self, _email: &str) -> Result<Subscriber> {
            unimplemented!()
        }

        async fn create_inquiry(
            &self,
            _inquiry: &NewInquiry,
            _attachments: &[StoredUpload],
        ) -> Result<InquiryWithAttachments> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn collects_root_and_all_descendants() {
        let store = TreeStore::new(&[("a", "b"), ("a", "c"), ("b", "d")]);

        let slugs = resolve_subtree(&store, "a", "en", PublicationStatus::Published)
            .await
            .unwrap();

        let set: HashSet<_> = slugs.iter().map(String::as_str).collect();
        assert_eq!(set, HashSet::from(["a", "b", "c", "d"]));
        assert_eq!(slugs.len(), 4);
        assert_eq!(slugs, vec!["a", "b", "d", "c"]);
    }

    #[tokio::test]
    async fn queries_in_requested_locale() {
        let store = TreeStore::new(&[("a", "b")]);
        let queries = store.queries.clone();

        resolve_subtree(&store, "a", "de-DE", PublicationStatus::Published)
            .await
            .unwrap();

        let queries = queries.lock().await;
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|(_, locale)| locale == "de-DE"));
    }

    #[tokio::test]
    async fn leaf_resolves_to_itself() {
        let store = TreeStore::new(&[]);

        let slugs = resolve_subtree(&store, "solo", "en", PublicationStatus::Published)
            .await
            .unwrap();

        assert_eq!(slugs, vec!["solo"]);
    }

    #[tokio::test]
    async fn cycles_terminate() {
        let store = TreeStore::new(&[("a", "b"), ("b", "c"), ("c", "a"), ("c", "b")]);

        let slugs = resolve_subtree(&store, "a", "en", PublicationStatus::Published)
            .await
            .unwrap();

        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn deep_chains_stop_at_the_depth_bound() {
        let names: Vec<String> = (0..MAX_SUBTREE_DEPTH + 10).map(|i| format!("n{}", i)).collect();
        let edges: Vec<(&str, &str)> = names
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();
        let store = TreeStore::new(&edges);

        let slugs = resolve_subtree(&store, "n0", "en", PublicationStatus::Published)
            .await
            .unwrap();

        assert_eq!(slugs.len(), MAX_SUBTREE_DEPTH + 1);
        assert_eq!(store.queries.lock().await.len(), MAX_SUBTREE_DEPTH);
    }

    #[tokio::test]
    async fn store_failure_aborts_resolution() {
        let mut store = TreeStore::new(&[("a", "b"), ("b", "c")]);
        store.fail_on = Some("b".to_string());

        let result = resolve_subtree(&store, "a", "en", PublicationStatus::Published).await;

        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
