use std::path::PathBuf;

use anyhow::Result;

use crate::infra::import::csv::{import_seed_to_sqlite, SeedReport, SeedSources};

pub struct ImportService {
    db_path: PathBuf,
}

impl ImportService {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Loads the bundled demo data unless the database already has some.
    pub fn seed_demo_data(&self) -> Result<SeedReport> {
        import_seed_to_sqlite(&self.db_path, &SeedSources::bundled())
    }
}
