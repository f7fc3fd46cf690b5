//! Store status summary

use crate::error::OrtomatResult;
use crate::storage::Store;

/// Render per-kind record counts as a small table
pub fn format_status(store: &Store) -> OrtomatResult<String> {
    let counts = store.counts()?;
    let total: usize = counts.iter().map(|(_, count)| count).sum();

    let mut out = String::from("Store Status\n============\n");
    for (kind, count) in &counts {
        out.push_str(&format!("  {:<22} {:>6}\n", kind.label(), count));
    }
    out.push_str(&format!("  {:<22} {:>6}\n", "Total", total));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::OrtomatPaths;
    use crate::models::EntityKind;
    use crate::storage::Persistence;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_status_lists_every_kind() {
        let temp = TempDir::new().unwrap();
        let mut store = Store::open(OrtomatPaths::with_base_dir(temp.path().to_path_buf())).unwrap();
        let machine = json!({"id": "m-1", "name": "Lobby"}).as_object().cloned().unwrap();
        store.create_many(EntityKind::Machines, vec![machine]).unwrap();

        let status = format_status(&store).unwrap();
        for kind in EntityKind::all() {
            assert!(status.contains(kind.label()), "missing {}", kind);
        }
        assert!(status.lines().last().unwrap().trim_end().ends_with('1'));
    }
}
