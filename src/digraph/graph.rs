use log::warn;

use super::error::GraphError;

/// Head/children view of a dependency parse.
///
/// Every token has exactly one head. A root token is its own head, which is what
/// terminates any upward walk over the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyTree {
    heads: Vec<usize>,
    /// Children of each token, in ascending index order
    children: Vec<Vec<usize>>,
}

impl DependencyTree {
    /// Build a tree from a head vector (`heads[i]` is the head of token `i`).
    pub fn from_heads(heads: Vec<usize>) -> Result<Self, GraphError> {
        let len = heads.len();
        if len == 0 {
            return Err(GraphError::Empty);
        }

        let mut children = vec![Vec::new(); len];
        for (token, &head) in heads.iter().enumerate() {
            if head >= len {
                return Err(GraphError::NodeOutOfBounds { index: head, len });
            }
            if head != token {
                children[head].push(token);
            }
        }

        let tree = Self { heads, children };
        tree.check_acyclic()?;
        Ok(tree)
    }

    /// Build a tree from `(head, dependent, label)` edges and explicit roots.
    ///
    /// Tokens without an incoming edge become roots. When a token has several
    /// incoming edges the first one wins.
    pub fn from_edges(
        num_tokens: usize,
        edges: &[(u32, u32, String)],
        roots: &[u32],
    ) -> Result<Self, GraphError> {
        let mut heads: Vec<Option<usize>> = vec![None; num_tokens];

        for (from, to, rel) in edges {
            let (from, to) = (*from as usize, *to as usize);
            for index in [from, to] {
                if index >= num_tokens {
                    return Err(GraphError::NodeOutOfBounds { index, len: num_tokens });
                }
            }
            if roots.contains(&(to as u32)) {
                continue;
            }
            match heads[to] {
                Some(existing) => {
                    warn!(
                        "Token {} already has head {}, ignoring extra edge {}->{}:{}",
                        to, existing, from, to, rel
                    );
                }
                None => heads[to] = Some(from),
            }
        }

        let heads = heads
            .into_iter()
            .enumerate()
            .map(|(i, head)| head.unwrap_or(i))
            .collect();
        Self::from_heads(heads)
    }

    /// Every head chain must reach a root within `len` steps.
    fn check_acyclic(&self) -> Result<(), GraphError> {
        let len = self.len();
        for start in 0..len {
            let mut node = start;
            let mut steps = 0;
            while !self.is_root(node) {
                node = self.heads[node];
                steps += 1;
                if steps > len {
                    return Err(GraphError::Cycle(start));
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    pub fn head(&self, token: usize) -> usize {
        self.heads[token]
    }

    pub fn heads(&self) -> &[usize] {
        &self.heads
    }

    pub fn children(&self, token: usize) -> &[usize] {
        &self.children[token]
    }

    pub fn is_root(&self, token: usize) -> bool {
        self.heads[token] == token
    }

    pub fn roots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&t| self.is_root(t)).collect()
    }

    /// Walk the head chain upwards, excluding `token` itself.
    pub fn ancestors(&self, token: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut node = token;
        while !self.is_root(node) {
            node = self.heads[node];
            chain.push(node);
        }
        chain
    }

    /// `token` and all of its descendants, sorted by index.
    pub fn subtree(&self, token: usize) -> Vec<usize> {
        let mut nodes = Vec::new();
        let mut stack = vec![token];
        while let Some(node) = stack.pop() {
            nodes.push(node);
            stack.extend_from_slice(&self.children[node]);
        }
        nodes.sort_unstable();
        nodes
    }

    /// Half-open bounds `[min, max + 1)` of the subtree rooted at `token`.
    pub fn subtree_bounds(&self, token: usize) -> (usize, usize) {
        let nodes = self.subtree(token);
        let start = nodes.first().copied().unwrap_or(token);
        let end = nodes.last().copied().unwrap_or(token) + 1;
        (start, end)
    }
}
