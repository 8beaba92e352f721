//! Catalog seed command.
//!
//! Inserts a demonstration catalog so a fresh deployment has something to
//! sell. Refuses to run against a non-empty catalog unless `--force` is
//! passed.

use std::sync::Arc;

use fournil_core::model::{CreateFlavor, CreateProduct, Flavor, Product};
use fournil_core::store::CatalogStore;
use fournil_core::store::postgres::PgStore;
use fournil_core::types::Money;
use sqlx::PgPool;

use super::{CommandError, database_url};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    price: i64,
    available: bool,
    flavors: &'static [(&'static str, i64)],
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Flanc",
        description: "Flanc pâtissier traditionnel, pâte croustillante",
        category: "gateaux",
        price: 2800,
        available: true,
        flavors: &[("Pistache", 200), ("Vanille", 0), ("Caramel beurre salé", 150)],
    },
    SeedProduct {
        name: "Tarte aux pommes",
        description: "Pommes fondantes sur pâte sablée",
        category: "tartes",
        price: 2200,
        available: true,
        flavors: &[],
    },
    SeedProduct {
        name: "Paris-Brest",
        description: "Pâte à choux, praliné noisette",
        category: "gateaux",
        price: 3200,
        available: true,
        flavors: &[("Noisette", 0), ("Praliné pécan", 300)],
    },
    SeedProduct {
        name: "Éclair au chocolat",
        description: "Chocolat noir 70%",
        category: "petits-gateaux",
        price: 450,
        available: true,
        flavors: &[],
    },
    SeedProduct {
        name: "Saint-Honoré",
        description: "Grand classique, sur commande uniquement",
        category: "gateaux",
        price: 3600,
        available: false,
        flavors: &[],
    },
];

/// Insert the demonstration catalog.
///
/// # Errors
///
/// Returns an error when the database is unreachable or a write fails.
pub async fn run(force: bool) -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    let existing = store.list_products(false).await?;
    if !existing.is_empty() && !force {
        tracing::warn!(
            count = existing.len(),
            "catalog is not empty; pass --force to seed anyway"
        );
        return Ok(());
    }

    for seed in CATALOG {
        let product = Product::new(CreateProduct {
            name: seed.name.to_owned(),
            description: Some(seed.description.to_owned()),
            category: Some(seed.category.to_owned()),
            price: Money::from_centimes(seed.price),
            image_url: None,
            available: Some(seed.available),
        });
        let product = store.insert_product(product).await?;

        for (flavor_name, modifier) in seed.flavors {
            let flavor = Flavor::new(
                product.id,
                CreateFlavor {
                    name: (*flavor_name).to_owned(),
                    price_modifier: Some(Money::from_centimes(*modifier)),
                },
            );
            store.insert_flavor(flavor).await?;
        }

        tracing::info!(product = seed.name, "seeded");
    }

    tracing::info!(count = CATALOG.len(), "catalog seeded");
    Ok(())
}
