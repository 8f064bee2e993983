//! Batch background removal CLI tool
//!
//! Command-line interface for removing backgrounds from a product-image tree
//! using the product-bgbatch library.

use product_bgbatch::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}
