use anyhow::Result;
use tracing::{info, warn};

use crate::table::Dataset;

/// Drop the listed columns. Names the table does not carry are logged and
/// returned rather than treated as fatal.
#[tracing::instrument(level = "info", skip_all, fields(requested = names.len()))]
pub fn drop_columns(ds: &Dataset, names: &[String]) -> Result<(Dataset, Vec<String>)> {
    let (pruned, missing) = ds.drop_columns(names)?;
    for name in &missing {
        warn!(column = %name, "column listed for dropping is not in the table");
    }
    info!(
        before = ds.num_columns(),
        after = pruned.num_columns(),
        "dropped columns"
    );
    Ok((pruned, missing))
}
