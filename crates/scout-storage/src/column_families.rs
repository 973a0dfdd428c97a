//! Column family definitions for RocksDB.
//!
//! Each column family isolates data with different access patterns:
//! - runs: append-only execution history (compressed)
//! - postings: scored posting records, mutated only for review status
//! - profiles: small per-tenant profile set, read on every run

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for run history
pub const CF_RUNS: &str = "runs";

/// Column family name for scored postings
pub const CF_POSTINGS: &str = "postings";

/// Column family name for search profiles
pub const CF_PROFILES: &str = "profiles";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_RUNS, CF_POSTINGS, CF_PROFILES];

/// Column family options for run history (append-only, compressed)
fn runs_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_RUNS, runs_options()),
        ColumnFamilyDescriptor::new(CF_POSTINGS, Options::default()),
        ColumnFamilyDescriptor::new(CF_PROFILES, Options::default()),
    ]
}
