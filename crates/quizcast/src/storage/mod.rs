pub mod staging;

pub use staging::{AssetStager, StagedAssets, StagingLease};
