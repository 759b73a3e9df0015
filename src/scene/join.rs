use std::collections::HashSet;

/// Result of matching a data pass against the elements already on stage.
///
/// `enter` and `update` hold indices into the data slice, in data order.
/// `exit` holds the stage keys the data no longer mentions, in stage order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinSets {
    pub enter: Vec<usize>,
    pub update: Vec<usize>,
    pub exit: Vec<String>,
}

/// Keyed join over a data slice and the keys currently on stage.
///
/// Each data item is assigned to exactly one of `enter` (key not on stage)
/// or `update` (key already on stage); stage keys absent from the data land
/// in `exit`. A duplicate key later in the data is dropped so one stage
/// element is never bound to two items in the same pass.
pub fn keyed_join<T, F>(items: &[T], key_of: F, stage: &[String]) -> JoinSets
where
    F: Fn(&T) -> String,
{
    let stage_keys: HashSet<&str> = stage.iter().map(String::as_str).collect();

    let mut sets = JoinSets::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let key = key_of(item);
        if !seen.insert(key.clone()) {
            continue;
        }
        if stage_keys.contains(key.as_str()) {
            sets.update.push(index);
        } else {
            sets.enter.push(index);
        }
    }

    for key in stage {
        if !seen.contains(key) {
            sets.exit.push(key.clone());
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partitions_with_no_overlap_or_omission() {
        let data = ["b", "c", "d"];
        let stage = keys(&["a", "b", "c"]);

        let sets = keyed_join(&data, |s| s.to_string(), &stage);

        assert_eq!(sets.enter, vec![2]);
        assert_eq!(sets.update, vec![0, 1]);
        assert_eq!(sets.exit, keys(&["a"]));

        // Every data index appears exactly once across enter/update.
        let mut bound: Vec<usize> = sets.enter.iter().chain(&sets.update).copied().collect();
        bound.sort();
        assert_eq!(bound, vec![0, 1, 2]);
    }

    #[test]
    fn empty_stage_enters_everything() {
        let data = ["x", "y"];
        let sets = keyed_join(&data, |s| s.to_string(), &[]);

        assert_eq!(sets.enter, vec![0, 1]);
        assert!(sets.update.is_empty());
        assert!(sets.exit.is_empty());
    }

    #[test]
    fn empty_data_exits_everything_in_stage_order() {
        let stage = keys(&["z", "a", "m"]);
        let sets = keyed_join::<&str, _>(&[], |s| s.to_string(), &stage);

        assert!(sets.enter.is_empty());
        assert!(sets.update.is_empty());
        assert_eq!(sets.exit, stage);
    }

    #[test]
    fn duplicate_data_key_is_dropped() {
        let data = ["a", "b", "a"];
        let stage = keys(&["a"]);

        let sets = keyed_join(&data, |s| s.to_string(), &stage);

        assert_eq!(sets.update, vec![0]);
        assert_eq!(sets.enter, vec![1]);
    }

    #[test]
    fn scoped_stage_list_leaves_other_keys_alone() {
        // Callers pass only the keys they manage; a key outside that list
        // (an axis, say) never shows up in exit.
        let data = ["dot:uno"];
        let stage = keys(&["dot:uno", "dot:dos"]);

        let sets = keyed_join(&data, |s| s.to_string(), &stage);

        assert_eq!(sets.update, vec![0]);
        assert_eq!(sets.exit, keys(&["dot:dos"]));
    }
}
