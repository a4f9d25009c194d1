//! Stats command handler.

use askdoc_core::{config::AppConfig, AppResult};
use askdoc_index::DocumentStore;
use clap::Args;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = DocumentStore::open(config.index_dir())?;
        let stats = store.stats();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else if stats.chunks == 0 {
            println!("Index is empty. Run 'askdoc ingest <paths>' to index documents.");
        } else {
            println!("Sources: {}", stats.sources);
            println!("Chunks:  {}", stats.chunks);
        }

        Ok(())
    }
}
