//! Unique cell names.

use std::collections::{HashMap, HashSet};

use arcstr::ArcStr;

/// Hands out names that are unique within one library.
///
/// A taken base name `cell` is disambiguated as `cell_1`, `cell_2`, and so on.
#[derive(Debug, Clone, Default)]
pub(crate) struct Names {
    taken: HashSet<ArcStr>,
    next_suffix: HashMap<ArcStr, usize>,
}

impl Names {
    pub(crate) fn assign(&mut self, base_name: &str) -> ArcStr {
        if !self.taken.contains(base_name) {
            let name = ArcStr::from(base_name);
            self.taken.insert(name.clone());
            return name;
        }

        let suffix = self.next_suffix.entry(base_name.into()).or_insert(1);
        loop {
            let candidate = arcstr::format!("{}_{}", base_name, suffix);
            *suffix += 1;
            if self.taken.insert(candidate.clone()) {
                break candidate;
            }
        }
    }
}
