use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{CategoryLink, Media, PublicationStatus};

/// Filterable attribute columns of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductAttribute {
    Length,
    Width,
    Material,
    Finish,
    Grade,
    WorkingLoadLimit,
    AssemblyBreakStrength,
    WebbingBreakStrength,
    EndFitting,
    FixedEndLength,
    RatchetHandle,
    ProductWeight,
}

impl ProductAttribute {
    pub const ALL: [ProductAttribute; 12] = [
        ProductAttribute::Length,
        ProductAttribute::Width,
        ProductAttribute::Material,
        ProductAttribute::Finish,
        ProductAttribute::Grade,
        ProductAttribute::WorkingLoadLimit,
        ProductAttribute::AssemblyBreakStrength,
        ProductAttribute::WebbingBreakStrength,
        ProductAttribute::EndFitting,
        ProductAttribute::FixedEndLength,
        ProductAttribute::RatchetHandle,
        ProductAttribute::ProductWeight,
    ];

    /// Column name; fixed identifiers, safe to splice into SQL.
    pub fn column(self) -> &'static str {
        match self {
            ProductAttribute::Length => "length",
            ProductAttribute::Width => "width",
            ProductAttribute::Material => "material",
            ProductAttribute::Finish => "finish",
            ProductAttribute::Grade => "grade",
            ProductAttribute::WorkingLoadLimit => "working_load_limit",
            ProductAttribute::AssemblyBreakStrength => "assembly_break_strength",
            ProductAttribute::WebbingBreakStrength => "webbing_break_strength",
            ProductAttribute::EndFitting => "end_fitting",
            ProductAttribute::FixedEndLength => "fixed_end_length",
            ProductAttribute::RatchetHandle => "ratchet_handle",
            ProductAttribute::ProductWeight => "product_weight",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct ProductAttributes {
    pub length: Option<String>,
    pub width: Option<String>,
    pub material: Option<String>,
    pub finish: Option<String>,
    pub grade: Option<String>,
    pub working_load_limit: Option<String>,
    pub assembly_break_strength: Option<String>,
    pub webbing_break_strength: Option<String>,
    pub end_fitting: Option<String>,
    pub fixed_end_length: Option<String>,
    pub ratchet_handle: Option<String>,
    pub product_weight: Option<String>,
}

impl ProductAttributes {
    pub fn get(&self, attribute: ProductAttribute) -> Option<&str> {
        let value = match attribute {
            ProductAttribute::Length => &self.length,
            ProductAttribute::Width => &self.width,
            ProductAttribute::Material => &self.material,
            ProductAttribute::Finish => &self.finish,
            ProductAttribute::Grade => &self.grade,
            ProductAttribute::WorkingLoadLimit => &self.working_load_limit,
            ProductAttribute::AssemblyBreakStrength => &self.assembly_break_strength,
            ProductAttribute::WebbingBreakStrength => &self.webbing_break_strength,
            ProductAttribute::EndFitting => &self.end_fitting,
            ProductAttribute::FixedEndLength => &self.fixed_end_length,
            ProductAttribute::RatchetHandle => &self.ratchet_handle,
            ProductAttribute::ProductWeight => &self.product_weight,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Value counts per attribute; attributes with no values are omitted.
pub type AttributeFilterCounts = BTreeMap<ProductAttribute, BTreeMap<String, i64>>;

pub fn count_attribute_values<'a, I>(products: I) -> AttributeFilterCounts
where
    I: IntoIterator<Item = &'a ProductAttributes>,
{
    let mut counts = AttributeFilterCounts::new();
    for product in products {
        for attribute in ProductAttribute::ALL {
            if let Some(value) = product.get(attribute) {
                *counts
                    .entry(attribute)
                    .or_default()
                    .entry(value.to_string())
                    .or_insert(0) += 1;
            }
        }
    }
    counts
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i32,
    pub document_id: Uuid,
    pub locale: String,
    pub name: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub price: Option<Decimal>,
    pub featured_image: Option<Json<Media>>,
    pub category: Option<Json<CategoryLink>>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attributes: ProductAttributes,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLink {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub featured_image: Option<Media>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub content: serde_json::Value,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub gallery: Json<Vec<Media>>,
    pub related_products: Json<Vec<ProductLink>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub locale_slugs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    pub fn order_by(self) -> &'static str {
        match self {
            ProductSort::Newest => "p.created_at DESC, p.id DESC",
            ProductSort::Oldest => "p.created_at ASC, p.id ASC",
            ProductSort::NameAsc => "p.name ASC, p.id ASC",
            ProductSort::NameDesc => "p.name DESC, p.id DESC",
            ProductSort::PriceAsc => "p.price ASC NULLS LAST, p.id ASC",
            ProductSort::PriceDesc => "p.price DESC NULLS LAST, p.id DESC",
        }
    }
}

/// Body of `POST /products/filter`. Attribute filters live in their own
/// map, so paging and status keys are never mistaken for data filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterProductsRequest {
    pub category_slug: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub locale: Option<String>,
    #[serde(default)]
    pub status: PublicationStatus,
    #[serde(default)]
    pub attributes: BTreeMap<ProductAttribute, String>,
    #[serde(default)]
    pub sort: ProductSort,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFiltersQuery {
    pub category_slug: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub status: PublicationStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub locale: Option<String>,
}

/// Resolved filter shared by a list query and its count query.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub locale: String,
    pub status: PublicationStatus,
    /// `None` = every category; `Some` = products in any of these slugs.
    pub category_slugs: Option<Vec<String>>,
    pub attributes: BTreeMap<ProductAttribute, String>,
    pub search: Option<String>,
}
