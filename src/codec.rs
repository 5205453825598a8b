use std::fmt::Display;

use thiserror::Error;

use crate::bitio::{BitRead, BitWrite};
use crate::huffman::{build_tree, code_table, Code, Node, Symbol, Weights, EOF_SYMBOL, SYMBOL_COUNT};

/// Identifies this container's tree-header variant. The only validity signal
/// before semantic decoding; there is no length, checksum, or version field.
pub const MAGIC: u32 = 0xface_8201;

const MAGIC_WIDTH: u32 = 32;
const BYTE_WIDTH: u32 = 8;
// Wide enough for 0..=256, the leaf alphabet of the serialized tree
const SYMBOL_WIDTH: u32 = 9;
// A genuine tree over 257 leaves never nests past 256 internal levels
const MAX_TREE_DEPTH: u32 = 300;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),
    #[error("input ended inside the tree header")]
    TruncatedHeader,
    #[error("tree header symbol {0} is out of range")]
    SymbolOutOfRange(u64),
    #[error("tree header nests deeper than any 257-leaf tree can")]
    HeaderTooDeep,
    #[error("tree header holds a lone leaf with no code structure")]
    DegenerateHeader,
    #[error("input ended before the end-of-stream code")]
    TruncatedPayload,
}

/// First pass: scans the source to exhaustion, counting every byte value.
pub fn count_weights<R: BitRead>(source: &mut R) -> Weights {
    let mut weights = [0; SYMBOL_COUNT];
    while let Some(byte) = source.read_bits(BYTE_WIDTH) {
        weights[byte as usize] += 1;
    }
    // The sentinel never occurs in raw input; force it into the tree
    weights[EOF_SYMBOL as usize] = 1;
    weights
}

// Preorder: an internal node is a single 0 bit followed by both subtrees, a
// leaf a single 1 bit followed by its 9-bit symbol. The recursion is
// self-delimiting, so no node count is written.
fn write_tree<W: BitWrite>(node: &Node, sink: &mut W) {
    match node {
        Node::Leaf { symbol } => {
            sink.write_bits(1, 1);
            sink.write_bits(SYMBOL_WIDTH, u64::from(*symbol));
        }
        Node::Internal { left, right } => {
            sink.write_bits(1, 0);
            write_tree(left, sink);
            write_tree(right, sink);
        }
    }
}

fn read_tree<R: BitRead>(source: &mut R, depth: u32) -> Result<Node, CodecError> {
    if depth > MAX_TREE_DEPTH {
        return Err(CodecError::HeaderTooDeep);
    }
    match source.read_bits(1).ok_or(CodecError::TruncatedHeader)? {
        0 => {
            let left = Box::new(read_tree(source, depth + 1)?);
            let right = Box::new(read_tree(source, depth + 1)?);
            Ok(Node::Internal { left, right })
        }
        _ => {
            let symbol = source
                .read_bits(SYMBOL_WIDTH)
                .ok_or(CodecError::TruncatedHeader)?;
            if symbol as usize >= SYMBOL_COUNT {
                return Err(CodecError::SymbolOutOfRange(symbol));
            }
            Ok(Node::Leaf {
                symbol: symbol as Symbol,
            })
        }
    }
}

/// Compresses `source` into `sink`: magic, preorder tree header, then one
/// code per source byte with the end-of-stream code last.
///
/// Takes two full passes over the source, one to count and one to encode,
/// so the reader must support [`BitRead::reset`].
pub fn compress<R: BitRead, W: BitWrite>(source: &mut R, sink: &mut W) {
    let weights = count_weights(source);
    let tree = build_tree(&weights);
    let codes = code_table(&tree);

    sink.write_bits(MAGIC_WIDTH, u64::from(MAGIC));
    write_tree(&tree, sink);

    source.reset();
    while let Some(byte) = source.read_bits(BYTE_WIDTH) {
        let code = codes[byte as usize].expect("every scanned byte was counted in the first pass");
        sink.write_bits(code.width, code.bits);
    }
    let eof = codes[EOF_SYMBOL as usize].expect("the sentinel always weighs at least 1");
    sink.write_bits(eof.width, eof.bits);
}

/// Decompresses `source` into `sink`, reproducing the original bytes
/// exactly. Terminates only at the end-of-stream leaf; exhausting the input
/// before then means the payload was truncated.
pub fn decompress<R: BitRead, W: BitWrite>(source: &mut R, sink: &mut W) -> Result<(), CodecError> {
    let tree = read_header(source)?;

    let mut cursor = &tree;
    loop {
        match cursor {
            Node::Internal { left, right } => {
                cursor = match source.read_bits(1).ok_or(CodecError::TruncatedPayload)? {
                    0 => left,
                    _ => right,
                };
            }
            Node::Leaf { symbol } => {
                if *symbol == EOF_SYMBOL {
                    return Ok(());
                }
                sink.write_bits(BYTE_WIDTH, u64::from(*symbol));
                cursor = &tree;
            }
        }
    }
}

fn read_header<R: BitRead>(source: &mut R) -> Result<Node, CodecError> {
    let magic = source
        .read_bits(MAGIC_WIDTH)
        .ok_or(CodecError::TruncatedHeader)?;
    if magic as u32 != MAGIC {
        return Err(CodecError::BadMagic(magic as u32));
    }
    let tree = read_tree(source, 0)?;
    // A lone-leaf tree has no bit paths to walk; this encoder never writes
    // one (see the placeholder policy in build_tree)
    if let Node::Leaf { .. } = tree {
        return Err(CodecError::DegenerateHeader);
    }
    Ok(tree)
}

/// Header summary of a compressed container, for `inspect`.
pub struct Summary {
    /// Bits taken by the magic and the serialized tree
    pub header_width: usize,
    /// Code per symbol present in the tree, in symbol order
    pub codes: Vec<(Symbol, Code)>,
}

/// Validates the magic and reads the tree header, without touching the
/// payload.
pub fn summarize<R: BitRead>(source: &mut R) -> Result<Summary, CodecError> {
    let tree = read_header(source)?;
    let codes = code_table(&tree)
        .iter()
        .enumerate()
        .filter_map(|(symbol, code)| code.map(|code| (symbol as Symbol, code)))
        .collect();
    Ok(Summary {
        header_width: MAGIC_WIDTH as usize + tree_width(&tree),
        codes,
    })
}

fn tree_width(node: &Node) -> usize {
    match node {
        Node::Leaf { .. } => 1 + SYMBOL_WIDTH as usize,
        Node::Internal { left, right } => 1 + tree_width(left) + tree_width(right),
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Magic number: {MAGIC:#010x}")?;
        writeln!(f, "Header length: {} bits", self.header_width)?;
        writeln!(f, "Symbols in tree: {}", self.codes.len())?;
        for (symbol, code) in &self.codes {
            let label = match *symbol {
                EOF_SYMBOL => "EOF".to_string(),
                s if (0x20..0x7f).contains(&s) => format!("{:?}", (s as u8) as char),
                s => format!("{s:#04x}"),
            };
            writeln!(
                f,
                "  {label:>6}  {:>2} bits  {:0width$b}",
                code.width,
                code.bits,
                width = code.width as usize
            )?;
        }
        Ok(())
    }
}
