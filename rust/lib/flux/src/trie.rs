use std::collections::HashMap;

use parking_lot::RwLock;

/// Topic trie with MQTT wildcards, shared by subscriptions and intent routing.
///
/// - `+` matches exactly one level
/// - `#` matches zero or more trailing levels and must be the last segment
///
/// ```ignore
/// let trie = Trie::new();
/// trie.insert("product/form", 1);
/// trie.insert("product/+", 2);
/// trie.insert("#", 3);
/// trie.match_topic("product/form"); // [1, 2, 3]
/// ```
pub struct Trie<T> {
    root: RwLock<Node<T>>,
}

struct Node<T> {
    children: HashMap<String, Node<T>>,
    single: Option<Box<Node<T>>>,
    multi: Option<Box<Node<T>>>,
    values: Vec<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            single: None,
            multi: None,
            values: Vec::new(),
        }
    }
}

impl<T: Clone> Trie<T> {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Node::default()),
        }
    }

    pub fn insert(&self, pattern: &str, value: T) {
        self.root.write().insert(pattern, value);
    }

    /// Every value whose pattern matches the concrete `topic`.
    ///
    /// Values are cloned out so callers run without holding the lock; a
    /// subscriber may therefore write state or subscribe again.
    pub fn match_topic(&self, topic: &str) -> Vec<T> {
        let mut out = Vec::new();
        self.root.read().collect(topic, &mut out);
        out
    }

    /// Drop the values under `pattern` for which `predicate` holds.
    pub fn remove<F>(&self, pattern: &str, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.root.write().remove(pattern, &predicate)
    }
}

impl<T: Clone> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Node<T> {
    fn insert(&mut self, pattern: &str, value: T) {
        if pattern.is_empty() {
            self.values.push(value);
            return;
        }
        let (head, rest) = split_first(pattern);
        match head {
            "+" => self
                .single
                .get_or_insert_with(Box::default)
                .insert(rest, value),
            "#" => self.multi.get_or_insert_with(Box::default).values.push(value),
            seg => self
                .children
                .entry(seg.to_string())
                .or_default()
                .insert(rest, value),
        }
    }

    fn collect(&self, topic: &str, out: &mut Vec<T>) {
        if let Some(multi) = &self.multi {
            out.extend(multi.values.iter().cloned());
        }
        if topic.is_empty() {
            out.extend(self.values.iter().cloned());
            return;
        }
        let (head, rest) = split_first(topic);
        if let Some(child) = self.children.get(head) {
            child.collect(rest, out);
        }
        if let Some(single) = &self.single {
            single.collect(rest, out);
        }
    }

    fn remove<F>(&mut self, pattern: &str, predicate: &F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let values = if pattern.is_empty() {
            Some(&mut self.values)
        } else {
            let (head, rest) = split_first(pattern);
            match head {
                "+" => return self.single.as_mut().is_some_and(|n| n.remove(rest, predicate)),
                "#" => self.multi.as_mut().map(|n| &mut n.values),
                seg => {
                    return self
                        .children
                        .get_mut(seg)
                        .is_some_and(|n| n.remove(rest, predicate))
                }
            }
        };
        match values {
            Some(values) => {
                let before = values.len();
                values.retain(|v| !predicate(v));
                values.len() < before
            }
            None => false,
        }
    }
}

/// `"product/form"` -> `("product", "form")`, `"app"` -> `("app", "")`.
fn split_first(path: &str) -> (&str, &str) {
    path.split_once('/').unwrap_or((path, ""))
}
