use std::{
    collections::HashMap,
    sync::LazyLock,
};

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{
        Category, CategoryLink, CategorySlugTree, CategoryWithRelations, PublicationStatus,
        SeoRow, SlugEntry,
    },
    queries::media_object,
};

static CATEGORY_COLUMNS: LazyLock<String> = LazyLock::new(|| {
    format!(
        "c.id, c.document_id, c.locale, c.parent_id, c.name, c.slug, c.description, c.sort, \
         {} AS featured_image, c.published_at, c.created_at, c.updated_at",
        media_object("c.featured_image_id")
    )
});

/// All categories of a locale (flat list)
pub async fn get_all(
    pool: &PgPool,
    locale: &str,
    status: PublicationStatus,
) -> Result<Vec<Category>> {
    let sql = format!(
        "SELECT {} FROM product_categories c
         WHERE c.locale = $1 AND ($2 OR c.published_at IS NOT NULL)
         ORDER BY c.sort ASC, c.name ASC",
        *CATEGORY_COLUMNS
    );

    let categories = sqlx::query_as::<_, Category>(&sql)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_all(pool)
        .await?;

    Ok(categories)
}

/// Find category by slug
pub async fn find_by_slug(
    pool: &PgPool,
    slug: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Option<Category>> {
    let sql = format!(
        "SELECT {} FROM product_categories c
         WHERE c.slug = $1 AND c.locale = $2 AND ($3 OR c.published_at IS NOT NULL)",
        *CATEGORY_COLUMNS
    );

    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(slug)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_optional(pool)
        .await?;

    Ok(category)
}

pub async fn find_seo_by_slug(
    pool: &PgPool,
    slug: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Option<SeoRow>> {
    let sql = format!(
        "SELECT c.document_id, c.locale, c.slug, c.name AS title, c.seo_title, c.seo_description,
                {} AS image, c.published_at, c.updated_at
         FROM product_categories c
         WHERE c.slug = $1 AND c.locale = $2 AND ($3 OR c.published_at IS NOT NULL)",
        media_object("c.featured_image_id")
    );

    let seo = sqlx::query_as::<_, SeoRow>(&sql)
        .bind(slug)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_optional(pool)
        .await?;

    Ok(seo)
}

/// Slugs of the direct children of `parent_slug`
pub async fn find_child_slugs(
    pool: &PgPool,
    parent_slug: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Vec<String>> {
    let slugs = sqlx::query_scalar::<_, String>(
        "SELECT c.slug FROM product_categories c
         INNER JOIN product_categories parent ON c.parent_id = parent.id
         WHERE parent.slug = $1 AND parent.locale = $2 AND c.locale = $2
           AND ($3 OR c.published_at IS NOT NULL)
         ORDER BY c.sort ASC, c.name ASC",
    )
    .bind(parent_slug)
    .bind(locale)
    .bind(status.includes_drafts())
    .fetch_all(pool)
    .await?;

    Ok(slugs)
}

/// Attach parent and direct children to every category.
pub fn with_relations(categories: Vec<Category>) -> Vec<CategoryWithRelations> {
    let links: HashMap<i32, CategoryLink> = categories
        .iter()
        .map(|c| (c.id, CategoryLink::from(c)))
        .collect();

    let mut children_map: HashMap<i32, Vec<CategoryLink>> = HashMap::new();
    for category in &categories {
        if let Some(parent_id) = category.parent_id {
            children_map
                .entry(parent_id)
                .or_default()
                .push(CategoryLink::from(category));
        }
    }

    categories
        .into_iter()
        .map(|category| CategoryWithRelations {
            parent: category.parent_id.and_then(|id| links.get(&id).cloned()),
            children: children_map.remove(&category.id).unwrap_or_default(),
            category,
        })
        .collect()
}

/// Slug, name and child slugs of every category, in input order.
pub fn slug_tree(categories: &[Category]) -> Vec<CategorySlugTree> {
    let mut children_map: HashMap<i32, Vec<SlugEntry>> = HashMap::new();
    for category in categories {
        if let Some(parent_id) = category.parent_id {
            children_map.entry(parent_id).or_default().push(SlugEntry {
                slug: category.slug.clone(),
            });
        }
    }

    categories
        .iter()
        .map(|category| CategorySlugTree {
            slug: category.slug.clone(),
            name: category.name.clone(),
            children: children_map.remove(&category.id).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn category(id: i32, parent_id: Option<i32>, slug: &str) -> Category {
        Category {
            id,
            document_id: Uuid::new_v4(),
            locale: "en".to_string(),
            parent_id,
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            description: None,
            sort: id,
            featured_image: None,
            published_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn relations_link_parents_and_children() {
        let categories = vec![
            category(1, None, "straps"),
            category(2, Some(1), "ratchet"),
            category(3, Some(1), "cam-buckle"),
        ];

        let related = with_relations(categories);

        assert_eq!(related[0].children.len(), 2);
        assert!(related[0].parent.is_none());
        assert_eq!(related[1].parent.as_ref().map(|p| p.slug.as_str()), Some("straps"));
        assert!(related[2].children.is_empty());
    }

    #[test]
    fn relations_ignore_parent_outside_the_list() {
        let related = with_relations(vec![category(5, Some(99), "orphan")]);
        assert!(related[0].parent.is_none());
    }

    #[test]
    fn slug_tree_lists_child_slugs() {
        let categories = vec![
            category(1, None, "straps"),
            category(2, Some(1), "ratchet"),
            category(3, Some(2), "heavy-duty"),
        ];

        let tree = slug_tree(&categories);

        assert_eq!(tree.len(), 3);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].slug, "ratchet");
        assert_eq!(tree[1].children[0].slug, "heavy-duty");
        assert!(tree[2].children.is_empty());
    }
}
