//! Remote LIMS access for evapro.
//!
//! Implements the core `LimsClientTrait` over diesel's MySQL backend, one
//! connection per remote target (billing and product/backup metadata).

mod client;
mod transform;

pub use client::LimsClient;
pub use transform::{compose_product_id, explode_product_ids};
