use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A raw byte value 0..=255, or [`EOF_SYMBOL`].
pub type Symbol = u16;

/// Synthetic end-of-stream marker. Raw 8-bit reads can never produce it, so
/// its weight is forced to 1 and it always ends up as a tree leaf.
pub const EOF_SYMBOL: Symbol = 256;

pub const SYMBOL_COUNT: usize = EOF_SYMBOL as usize + 1;

pub type Weights = [u64; SYMBOL_COUNT];

#[derive(Debug, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: Symbol },
    Internal { left: Box<Node>, right: Box<Node> },
}

// Forest entry during the merge loop. Weights matter only while merging, so
// they live here rather than in the finished tree.
struct Ranked {
    weight: u64,
    // Insertion order, the deterministic tie-break between equal weights
    seq: u32,
    node: Node,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.weight, self.seq).cmp(&(other.weight, other.seq))
    }
}

/// Builds the code tree by repeatedly merging the two lightest forest nodes.
/// The first node extracted becomes the left child.
pub fn build_tree(weights: &Weights) -> Node {
    let mut forest = BinaryHeap::new();
    let mut seq = 0;
    for (symbol, &weight) in weights.iter().enumerate() {
        if weight > 0 {
            forest.push(Reverse(Ranked {
                weight,
                seq,
                node: Node::Leaf {
                    symbol: symbol as Symbol,
                },
            }));
            seq += 1;
        }
    }

    // A lone positive-weight symbol would end up with an empty code. Pair it
    // with a zero-weight placeholder leaf so every code is at least one bit.
    if forest.len() == 1 {
        forest.push(Reverse(Ranked {
            weight: 0,
            seq,
            node: Node::Leaf { symbol: 0 },
        }));
        seq += 1;
    }

    while forest.len() > 1 {
        let Reverse(first) = forest.pop().unwrap();
        let Reverse(second) = forest.pop().unwrap();
        forest.push(Reverse(Ranked {
            weight: first.weight + second.weight,
            seq,
            node: Node::Internal {
                left: Box::new(first.node),
                right: Box::new(second.node),
            },
        }));
        seq += 1;
    }

    forest
        .pop()
        .map(|Reverse(root)| root.node)
        .expect("the weight table always holds the end-of-stream sentinel")
}

/// Root-to-leaf path of one symbol, packed most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub bits: u64,
    pub width: u32,
}

/// Walks the tree and records each leaf's path: left appends a 0 bit, right
/// a 1. Symbols without a leaf keep no entry and must never be looked up.
pub fn code_table(root: &Node) -> [Option<Code>; SYMBOL_COUNT] {
    let mut table = [None; SYMBOL_COUNT];
    record_codes(root, Code { bits: 0, width: 0 }, &mut table);
    table
}

fn record_codes(node: &Node, path: Code, table: &mut [Option<Code>; SYMBOL_COUNT]) {
    match node {
        Node::Leaf { symbol } => table[*symbol as usize] = Some(path),
        Node::Internal { left, right } => {
            record_codes(
                left,
                Code {
                    bits: path.bits << 1,
                    width: path.width + 1,
                },
                table,
            );
            record_codes(
                right,
                Code {
                    bits: path.bits << 1 | 1,
                    width: path.width + 1,
                },
                table,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights_of(pairs: &[(Symbol, u64)]) -> Weights {
        let mut weights = [0; SYMBOL_COUNT];
        for &(symbol, weight) in pairs {
            weights[symbol as usize] = weight;
        }
        weights[EOF_SYMBOL as usize] = 1;
        weights
    }

    #[test]
    fn lighter_nodes_sit_deeper_never_shallower() {
        let weights = weights_of(&[(b'a'.into(), 40), (b'b'.into(), 3), (b'c'.into(), 2)]);
        let table = code_table(&build_tree(&weights));
        let width = |s: Symbol| table[s as usize].unwrap().width;
        assert!(width(b'a'.into()) < width(b'b'.into()));
        assert!(width(b'b'.into()) <= width(b'c'.into()));
        assert!(width(b'c'.into()) <= width(EOF_SYMBOL));
    }

    #[test]
    fn equal_weights_break_ties_by_symbol_order() {
        // a and b both weigh 1 and were inserted before EOF, so they merge
        // first with a on the left
        let weights = weights_of(&[(b'a'.into(), 1), (b'b'.into(), 1)]);
        let tree = build_tree(&weights);
        let table = code_table(&tree);
        assert_eq!(Code { bits: 0b0, width: 1 }, table[EOF_SYMBOL as usize].unwrap());
        assert_eq!(Code { bits: 0b10, width: 2 }, table[b'a' as usize].unwrap());
        assert_eq!(Code { bits: 0b11, width: 2 }, table[b'b' as usize].unwrap());
    }

    #[test]
    fn single_symbol_input_still_gets_a_two_leaf_tree() {
        let weights = weights_of(&[(b'A'.into(), 1000)]);
        let tree = build_tree(&weights);
        let Node::Internal { left, right } = &tree else {
            panic!("expected an internal root, got {tree:?}");
        };
        // EOF weighs 1, 'A' weighs 1000, so EOF is extracted first
        assert_eq!(Node::Leaf { symbol: EOF_SYMBOL }, **left);
        assert_eq!(Node::Leaf { symbol: b'A'.into() }, **right);
    }

    #[test]
    fn eof_alone_is_paired_with_a_placeholder() {
        let weights = weights_of(&[]);
        let table = code_table(&build_tree(&weights));
        assert_eq!(Code { bits: 0b0, width: 1 }, table[0].unwrap());
        assert_eq!(Code { bits: 0b1, width: 1 }, table[EOF_SYMBOL as usize].unwrap());
    }

    #[test]
    fn no_code_is_a_prefix_of_another() {
        let mut weights = weights_of(&[]);
        for (symbol, weight) in weights.iter_mut().enumerate().take(64) {
            *weight = (symbol as u64 * 7919) % 97 + 1;
        }
        let codes: Vec<Code> = code_table(&build_tree(&weights))
            .iter()
            .flatten()
            .copied()
            .collect();
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                let (short, long) = if a.width <= b.width { (a, b) } else { (b, a) };
                assert_ne!(
                    short.bits,
                    long.bits >> (long.width - short.width),
                    "{short:?} prefixes {long:?}"
                );
            }
        }
    }

    #[test]
    fn every_positive_weight_becomes_a_leaf() {
        let weights = weights_of(&[(0, 5), (127, 5), (255, 5)]);
        let table = code_table(&build_tree(&weights));
        assert_eq!(4, table.iter().flatten().count());
        assert!(table[EOF_SYMBOL as usize].is_some());
    }
}
