//! Persisted domain entities and their input types.

pub mod audit;
pub mod order;
pub mod product;

pub use audit::{Actor, AuditFilter, AuditLogEntry, NewAuditEntry};
pub use order::{
    CreateOrder, FlavorSelection, ItemOptions, Order, OrderFilter, OrderItem, OrderItemRequest,
    OrderStats, ResolvedItems,
};
pub use product::{CreateFlavor, CreateProduct, Flavor, Product, UpdateFlavor, UpdateProduct};
