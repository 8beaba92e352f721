//! Catalog entities: products and their flavor variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{FlavorId, Money, ProductId};

/// A product in the catalog.
///
/// The base price is the price of the product without any flavor selected.
/// Orders never reference a product's live price; they snapshot it at
/// creation time (see [`crate::model::OrderItem`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Optional category (e.g. "gateaux", "viennoiseries").
    pub category: Option<String>,
    /// Base price in centimes. Never negative.
    pub price: Money,
    /// Optional product image URL.
    pub image_url: Option<String>,
    /// Whether the product can currently be ordered.
    pub available: bool,
    /// Flavor variants owned by this product.
    pub flavors: Vec<Flavor>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new product from creation input.
    #[must_use]
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            name: input.name,
            description: input.description,
            category: input.category,
            price: input.price,
            image_url: input.image_url,
            available: input.available.unwrap_or(true),
            flavors: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find an owned flavor by ID.
    #[must_use]
    pub fn flavor_by_id(&self, id: FlavorId) -> Option<&Flavor> {
        self.flavors.iter().find(|f| f.id == id)
    }

    /// Find an owned flavor by case-insensitive name.
    #[must_use]
    pub fn flavor_by_name(&self, name: &str) -> Option<&Flavor> {
        self.flavors
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// A named variant of a product carrying a price adjustment.
///
/// Owned by exactly one product; deleting the product deletes its flavors.
/// Existing orders are unaffected, they snapshot the flavor at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flavor {
    /// Unique flavor ID.
    pub id: FlavorId,
    /// Owning product.
    pub product_id: ProductId,
    /// Display name (e.g. "Pistache").
    pub name: String,
    /// Signed adjustment applied on top of the product's base price.
    pub price_modifier: Money,
    /// When the flavor was created.
    pub created_at: DateTime<Utc>,
    /// When the flavor was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Flavor {
    /// Build a new flavor for a product from creation input.
    #[must_use]
    pub fn new(product_id: ProductId, input: CreateFlavor) -> Self {
        let now = Utc::now();
        Self {
            id: FlavorId::generate(),
            product_id,
            name: input.name,
            price_modifier: input.price_modifier.unwrap_or(Money::ZERO),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Optional category.
    pub category: Option<String>,
    /// Base price in centimes.
    pub price: Money,
    /// Optional product image URL.
    pub image_url: Option<String>,
    /// Availability flag; defaults to true.
    pub available: Option<bool>,
}

/// Input for updating a product. All fields optional; absent means unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Money>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
}

/// Input for creating a flavor under a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFlavor {
    /// Display name, unique per product in practice (not enforced).
    pub name: String,
    /// Signed price adjustment in centimes; defaults to zero.
    pub price_modifier: Option<Money>,
}

/// Input for updating a flavor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFlavor {
    pub name: Option<String>,
    pub price_modifier: Option<Money>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pistache(product_id: ProductId) -> Flavor {
        Flavor::new(
            product_id,
            CreateFlavor {
                name: "Pistache".to_owned(),
                price_modifier: Some(Money::from_centimes(200)),
            },
        )
    }

    #[test]
    fn test_flavor_lookup_by_name_is_case_insensitive() {
        let mut product = Product::new(CreateProduct {
            name: "Flanc".to_owned(),
            description: None,
            category: None,
            price: Money::from_centimes(2800),
            image_url: None,
            available: None,
        });
        product.flavors.push(pistache(product.id));

        assert!(product.flavor_by_name("pistache").is_some());
        assert!(product.flavor_by_name("PISTACHE").is_some());
        assert!(product.flavor_by_name("Vanille").is_none());
    }

    #[test]
    fn test_new_product_defaults_to_available() {
        let product = Product::new(CreateProduct {
            name: "Tarte".to_owned(),
            description: None,
            category: None,
            price: Money::from_centimes(2200),
            image_url: None,
            available: None,
        });
        assert!(product.available);
        assert!(product.flavors.is_empty());
    }
}
