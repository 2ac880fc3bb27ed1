use ahash::AHashMap;

struct TrieNode<T> {
    children: AHashMap<char, TrieNode<T>>,
    is_end_of_word: bool,
    results: Vec<T>,
}

impl<T> Default for TrieNode<T> {
    fn default() -> Self {
        Self {
            children: AHashMap::new(),
            is_end_of_word: false,
            results: Vec::new(),
        }
    }
}

/// Result of [`Trie::longest_prefix_lookup`].
#[derive(Debug, PartialEq)]
pub struct PrefixMatch<'a, T> {
    /// True when the whole key ends on an inserted word.
    pub exact_match: bool,
    /// Results of the key itself, or of the deepest populated prefix on the path.
    pub results: &'a [T],
}

/// Character trie caching result lists per query string.
///
/// Only grows: there is no removal, the whole trie is dropped with its owner.
pub struct Trie<T> {
    root: TrieNode<T>,
    words: usize,
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Trie<T> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            words: 0,
        }
    }

    /// Appends `values` to the results stored under `key`.
    ///
    /// Repeated inserts accumulate. The empty key lives on the root.
    pub fn insert<I>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut curr = &mut self.root;
        for c in key.chars() {
            curr = curr.children.entry(c).or_default();
        }
        if !curr.is_end_of_word {
            curr.is_end_of_word = true;
            self.words += 1;
        }
        curr.results.extend(values);
    }

    /// Results stored exactly under `key`, empty on a miss.
    pub fn exact_lookup(&self, key: &str) -> &[T] {
        match self.find(key) {
            Some(node) => &node.results,
            None => &[],
        }
    }

    /// Looks up `key`, falling back to the deepest prefix that holds results.
    pub fn longest_prefix_lookup(&self, key: &str) -> PrefixMatch<'_, T> {
        let mut curr = &self.root;
        let mut last_valid: &[T] = if self.root.results.is_empty() {
            &[]
        } else {
            &self.root.results
        };

        for c in key.chars() {
            match curr.children.get(&c) {
                Some(node) => curr = node,
                None => {
                    return PrefixMatch {
                        exact_match: false,
                        results: last_valid,
                    }
                }
            }
            if !curr.results.is_empty() {
                last_valid = &curr.results;
            }
        }

        PrefixMatch {
            exact_match: curr.is_end_of_word,
            results: last_valid,
        }
    }

    /// Number of distinct keys inserted so far.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    fn find(&self, key: &str) -> Option<&TrieNode<T>> {
        let mut curr = &self.root;
        for c in key.chars() {
            curr = curr.children.get(&c)?;
        }
        Some(curr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn minecraft_trie() -> Trie<&'static str> {
        let mut trie = Trie::new();
        trie.insert("mine", ["m1"]);
        trie.insert("minecraft", ["m2"]);
        trie
    }

    #[test]
    fn repeated_inserts_accumulate_in_order() {
        let mut trie = Trie::new();
        trie.insert("key", ["a", "b"]);
        trie.insert("key", ["c"]);
        assert_eq!(trie.exact_lookup("key"), &["a", "b", "c"]);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn exact_lookup_misses_on_intermediate_node() {
        let mut trie = Trie::new();
        trie.insert("cat", ["feline"]);
        assert!(trie.exact_lookup("ca").is_empty());
        assert!(trie.exact_lookup("dog").is_empty());
        assert_eq!(trie.exact_lookup("cat"), &["feline"]);
    }

    #[test]
    fn empty_key_lives_on_root() {
        let mut trie = Trie::new();
        trie.insert("", ["root"]);
        assert_eq!(trie.exact_lookup(""), &["root"]);
        let found = trie.longest_prefix_lookup("");
        assert!(found.exact_match);
        assert_eq!(found.results, &["root"]);
        // The root is the shallowest fallback.
        assert_eq!(trie.longest_prefix_lookup("xyz").results, &["root"]);
    }

    #[test]
    fn empty_insert_marks_key_as_searched() {
        let mut trie: Trie<String> = Trie::new();
        trie.insert("nothing", Vec::new());
        let found = trie.longest_prefix_lookup("nothing");
        assert!(found.exact_match);
        assert!(found.results.is_empty());
        assert!(!trie.is_empty());
    }

    #[rstest]
    #[case("minecraf", false, &["m1"])]
    #[case("minecraft", true, &["m2"])]
    #[case("minecrafts", false, &["m2"])]
    #[case("mine", true, &["m1"])]
    #[case("miner", false, &["m1"])]
    #[case("min", false, &[])]
    #[case("zzz", false, &[])]
    fn longest_prefix_falls_back_to_deepest_populated_node(
        #[case] key: &str,
        #[case] exact: bool,
        #[case] expected: &[&str],
    ) {
        let trie = minecraft_trie();
        let found = trie.longest_prefix_lookup(key);
        assert_eq!(found.exact_match, exact, "exact flag for {key:?}");
        assert_eq!(found.results, expected, "results for {key:?}");
    }

    #[test]
    fn end_of_word_without_results_falls_back_but_stays_exact() {
        let mut trie = Trie::new();
        trie.insert("mine", ["m1"]);
        trie.insert("minecraft", Vec::new());
        let found = trie.longest_prefix_lookup("minecraft");
        assert!(found.exact_match);
        assert_eq!(found.results, &["m1"]);
    }
}
