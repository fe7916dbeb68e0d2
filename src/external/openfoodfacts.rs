// ABOUTME: OpenFoodFacts API client for product and nutrition retrieval
// ABOUTME: Implements barcode lookup, name search, TTL caching, and rate limiting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! `OpenFoodFacts` catalog client.
//!
//! Free, no-auth product database keyed by barcode. Responses are cached
//! client-side for the configured TTL and outgoing requests are throttled
//! with a sliding-window rate limiter so bursts of scans do not hammer the
//! public API.
//!
//! API reference: <https://world.openfoodfacts.org/data>

use crate::external::{CatalogError, CatalogProduct, ProductNutritionLookup};
use crate::models::NutritionRecord;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use url::Url;

/// Nutriment keys mapped into [`NutritionRecord::micronutrients`].
/// Keys are the `OpenFoodFacts` per-100g nutriment names; values our names.
const MICRONUTRIENT_KEYS: &[(&str, &str)] = &[
    ("fiber_100g", "fiber"),
    ("sugars_100g", "sugar"),
    ("sodium_100g", "sodium"),
    ("salt_100g", "salt"),
    ("saturated-fat_100g", "saturated_fat"),
    ("vitamin-c_100g", "vitamin_c"),
    ("calcium_100g", "calcium"),
    ("iron_100g", "iron"),
];

/// Client configuration.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsConfig {
    /// Base URL of the v2 API
    pub base_url: String,
    /// User-Agent sent with every request, as the API terms require
    pub user_agent: String,
    /// Cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Sliding-window request limit per minute
    pub rate_limit_per_minute: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org/api/v2".to_owned(),
            user_agent: concat!("nutriscan/", env!("CARGO_PKG_VERSION")).to_owned(),
            cache_ttl_secs: 86400, // 24 hours
            rate_limit_per_minute: 60,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    product: Option<CatalogProduct>,
    expires_at: Instant,
}

/// Sliding-window rate limiter over request timestamps.
#[derive(Debug)]
struct RateLimiter {
    requests: Vec<Instant>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    const fn new(limit: u32) -> Self {
        Self {
            requests: Vec::new(),
            limit,
            window: Duration::from_secs(60),
        }
    }

    fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        self.requests.retain(|&t| now.duration_since(t) < self.window);
        if self.requests.len() < self.limit as usize {
            self.requests.push(now);
            true
        } else {
            false
        }
    }
}

/// HTTP client for the `OpenFoodFacts` v2 API.
pub struct OpenFoodFactsClient {
    config: OpenFoodFactsConfig,
    http: reqwest::Client,
    cache: RwLock<HashMap<String, CacheEntry>>,
    limiter: Mutex<RateLimiter>,
}

impl OpenFoodFactsClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidResponse`] when the base URL is not a
    /// valid URL or the underlying HTTP client cannot be constructed.
    pub fn new(config: OpenFoodFactsConfig) -> Result<Self, CatalogError> {
        Url::parse(&config.base_url)
            .map_err(|e| CatalogError::InvalidResponse(format!("bad catalog base url: {e}")))?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(Self {
            limiter: Mutex::new(RateLimiter::new(config.rate_limit_per_minute)),
            config,
            http,
            cache: RwLock::new(HashMap::new()),
        })
    }

    async fn cached(&self, key: &str) -> Option<Option<CatalogProduct>> {
        let cache = self.cache.read().await;
        cache
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.product.clone())
    }

    async fn store(&self, key: String, product: Option<CatalogProduct>) {
        let mut cache = self.cache.write().await;
        cache.insert(
            key,
            CacheEntry {
                product,
                expires_at: Instant::now() + Duration::from_secs(self.config.cache_ttl_secs),
            },
        );
    }

    async fn throttle(&self) -> Result<(), CatalogError> {
        let mut limiter = self.limiter.lock().await;
        if limiter.try_acquire() {
            Ok(())
        } else {
            Err(CatalogError::RateLimited)
        }
    }

    async fn fetch_by_barcode(&self, barcode: &str) -> Result<Option<CatalogProduct>, CatalogError> {
        self.throttle().await?;
        let url = format!("{}/product/{barcode}.json", self.config.base_url);
        debug!(%barcode, "catalog barcode lookup");
        let response = self.http.get(&url).send().await?;
        // The API answers 404 for unknown codes on some deployments and
        // status==0 bodies on others; both mean "not found".
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CatalogError::Http {
                status: response.status().as_u16(),
            });
        }
        let body: ProductEnvelope = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        if body.status != 1 {
            return Ok(None);
        }
        Ok(body.product.map(|p| p.into_catalog_product()))
    }

    async fn search_first(&self, query: &str) -> Result<Option<CatalogProduct>, CatalogError> {
        self.throttle().await?;
        let url = format!("{}/search", self.config.base_url);
        debug!(%query, "catalog name search");
        let response = self
            .http
            .get(&url)
            .query(&[("search_terms", query), ("page_size", "1"), ("json", "1")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CatalogError::Http {
                status: response.status().as_u16(),
            });
        }
        let body: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(body
            .products
            .into_iter()
            .next()
            .map(ProductPayload::into_catalog_product))
    }
}

#[async_trait]
impl ProductNutritionLookup for OpenFoodFactsClient {
    async fn resolve_barcode(&self, barcode: &str) -> Result<Option<CatalogProduct>, CatalogError> {
        let key = format!("barcode:{barcode}");
        if let Some(hit) = self.cached(&key).await {
            return Ok(hit);
        }
        let product = self.fetch_by_barcode(barcode).await?;
        self.store(key, product.clone()).await;
        Ok(product)
    }

    async fn resolve_label(&self, label: &str) -> Result<Option<CatalogProduct>, CatalogError> {
        let key = format!("label:{}", label.to_lowercase());
        if let Some(hit) = self.cached(&key).await {
            return Ok(hit);
        }
        let product = self.search_first(label).await?;
        self.store(key, product.clone()).await;
        Ok(product)
    }
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(default)]
    status: i32,
    product: Option<ProductPayload>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    products: Vec<ProductPayload>,
}

#[derive(Debug, Deserialize)]
struct ProductPayload {
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    brands: String,
    #[serde(default)]
    categories: String,
    #[serde(default)]
    allergens: String,
    #[serde(default)]
    nutriments: HashMap<String, serde_json::Value>,
}

impl ProductPayload {
    fn into_catalog_product(self) -> CatalogProduct {
        let nutrition = extract_nutrition(&self.nutriments);
        CatalogProduct {
            name: self.product_name.trim().to_owned(),
            brand: non_empty(self.brands.trim()),
            categories: split_tags(&self.categories),
            allergens: split_tags(&self.allergens),
            nutrition,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}

/// Split comma-separated tag strings, stripping the `en:` language prefix
/// the API uses on allergen tags.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().trim_start_matches("en:").to_owned())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn nutriment_f64(nutriments: &HashMap<String, serde_json::Value>, key: &str) -> Option<f64> {
    match nutriments.get(key)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Map the per-100g nutriment block into a [`NutritionRecord`].
///
/// Returns `None` when even the calorie field is missing; partial macro
/// data defaults the absent fields to zero, matching how the catalog
/// reports sparse entries.
fn extract_nutrition(nutriments: &HashMap<String, serde_json::Value>) -> Option<NutritionRecord> {
    let calories = nutriment_f64(nutriments, "energy-kcal_100g")?;
    let protein = nutriment_f64(nutriments, "proteins_100g").unwrap_or(0.0);
    let carbs = nutriment_f64(nutriments, "carbohydrates_100g").unwrap_or(0.0);
    let fat = nutriment_f64(nutriments, "fat_100g").unwrap_or(0.0);

    let mut record = match NutritionRecord::new(calories, protein, carbs, fat) {
        Ok(record) => record,
        Err(err) => {
            warn!(%err, "catalog reported invalid nutriments, dropping record");
            return None;
        }
    };
    for (api_key, our_key) in MICRONUTRIENT_KEYS {
        if let Some(amount) = nutriment_f64(nutriments, api_key) {
            if let Ok(updated) = record.clone().with_micronutrient(*our_key, amount) {
                record = updated;
            }
        }
    }
    Some(record)
}

/// In-memory catalog for tests and offline development.
#[derive(Default)]
pub struct MockCatalogClient {
    by_barcode: RwLock<HashMap<String, CatalogProduct>>,
    by_label: RwLock<HashMap<String, CatalogProduct>>,
}

impl MockCatalogClient {
    /// Empty mock catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product under a barcode
    pub async fn insert_barcode(&self, barcode: impl Into<String>, product: CatalogProduct) {
        self.by_barcode
            .write()
            .await
            .insert(barcode.into(), product);
    }

    /// Register a product under a lowercase label
    pub async fn insert_label(&self, label: impl Into<String>, product: CatalogProduct) {
        self.by_label
            .write()
            .await
            .insert(label.into().to_lowercase(), product);
    }
}

#[async_trait]
impl ProductNutritionLookup for MockCatalogClient {
    async fn resolve_barcode(&self, barcode: &str) -> Result<Option<CatalogProduct>, CatalogError> {
        Ok(self.by_barcode.read().await.get(barcode).cloned())
    }

    async fn resolve_label(&self, label: &str) -> Result<Option<CatalogProduct>, CatalogError> {
        Ok(self
            .by_label
            .read()
            .await
            .get(&label.to_lowercase())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_splitting_strips_language_prefix() {
        let tags = split_tags("en:milk, en:nuts,  gluten ");
        assert_eq!(tags, vec!["milk", "nuts", "gluten"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn nutrition_requires_calories() {
        let mut nutriments = HashMap::new();
        nutriments.insert("proteins_100g".to_owned(), serde_json::json!(10.0));
        assert!(extract_nutrition(&nutriments).is_none());

        nutriments.insert("energy-kcal_100g".to_owned(), serde_json::json!(89));
        nutriments.insert("fiber_100g".to_owned(), serde_json::json!("2.6"));
        let record = extract_nutrition(&nutriments).expect("nutrition present");
        assert!((record.calories - 89.0).abs() < 1e-9);
        assert_eq!(record.micronutrient("fiber"), Some(2.6));
    }

    #[test]
    fn rate_limiter_caps_burst() {
        let mut limiter = RateLimiter::new(2);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
