//! Word dictionary
//!
//! Words are stored in definition order in a vector and indexed by lowercase
//! name in an [`FxHashMap`]. Redefining a name shadows the older word for later
//! lookups while definitions already compiled keep calling the old one.
//!
//! The dictionary is bounded by a cell budget fixed at `init`: every header
//! costs [`HEADER_CELLS`] and every compiled instruction one cell.

use super::constants::HEADER_CELLS;
use super::errors::ForthError;
use crate::memory::Cell;
use rustc_hash::FxHashMap;
use std::rc::Rc;

pub type WordId = usize;

/// Built-in words implemented in Rust
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    DivMod,
    Negate,
    Abs,
    Min,
    Max,
    OnePlus,
    OneMinus,
    TwoStar,
    TwoSlash,
    And,
    Or,
    Xor,
    Invert,
    Lshift,
    Rshift,
    Eq,
    NotEq,
    Less,
    Greater,
    ZeroEq,
    ZeroLess,
    ULess,
    Dup,
    Drop,
    Swap,
    Over,
    Rot,
    Nip,
    Tuck,
    QDup,
    TwoDup,
    TwoDrop,
    Depth,
    Clear,
    ToR,
    RFrom,
    RFetch,
    I,
    J,
    Dot,
    UDot,
    DotS,
    Cr,
    Emit,
    Space,
    Spaces,
    Type,
    Hex,
    Decimal,
    Base,
    Store,
    Fetch,
    PlusStore,
    CStore,
    CFetch,
    Here,
    Allot,
    Comma,
    Cells,
    Words,
    Ver,
    Leds,
    Refresh,
}

pub const PRIMITIVES: &[(&str, Prim)] = &[
    ("+", Prim::Add),
    ("-", Prim::Sub),
    ("*", Prim::Mul),
    ("/", Prim::Div),
    ("mod", Prim::Mod),
    ("/mod", Prim::DivMod),
    ("negate", Prim::Negate),
    ("abs", Prim::Abs),
    ("min", Prim::Min),
    ("max", Prim::Max),
    ("1+", Prim::OnePlus),
    ("1-", Prim::OneMinus),
    ("2*", Prim::TwoStar),
    ("2/", Prim::TwoSlash),
    ("and", Prim::And),
    ("or", Prim::Or),
    ("xor", Prim::Xor),
    ("invert", Prim::Invert),
    ("lshift", Prim::Lshift),
    ("rshift", Prim::Rshift),
    ("=", Prim::Eq),
    ("<>", Prim::NotEq),
    ("<", Prim::Less),
    (">", Prim::Greater),
    ("0=", Prim::ZeroEq),
    ("0<", Prim::ZeroLess),
    ("u<", Prim::ULess),
    ("dup", Prim::Dup),
    ("drop", Prim::Drop),
    ("swap", Prim::Swap),
    ("over", Prim::Over),
    ("rot", Prim::Rot),
    ("nip", Prim::Nip),
    ("tuck", Prim::Tuck),
    ("?dup", Prim::QDup),
    ("2dup", Prim::TwoDup),
    ("2drop", Prim::TwoDrop),
    ("depth", Prim::Depth),
    ("clear", Prim::Clear),
    (">r", Prim::ToR),
    ("r>", Prim::RFrom),
    ("r@", Prim::RFetch),
    ("i", Prim::I),
    ("j", Prim::J),
    (".", Prim::Dot),
    ("u.", Prim::UDot),
    (".s", Prim::DotS),
    ("cr", Prim::Cr),
    ("emit", Prim::Emit),
    ("space", Prim::Space),
    ("spaces", Prim::Spaces),
    ("type", Prim::Type),
    ("hex", Prim::Hex),
    ("decimal", Prim::Decimal),
    ("base", Prim::Base),
    ("!", Prim::Store),
    ("@", Prim::Fetch),
    ("+!", Prim::PlusStore),
    ("c!", Prim::CStore),
    ("c@", Prim::CFetch),
    ("here", Prim::Here),
    ("allot", Prim::Allot),
    (",", Prim::Comma),
    ("cells", Prim::Cells),
    ("words", Prim::Words),
    (".ver", Prim::Ver),
    ("leds", Prim::Leds),
    ("refresh", Prim::Refresh),
];

/// One compiled instruction of a colon definition
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    Lit(Cell),
    Prim(Prim),
    Call(WordId),
    Branch(usize),
    BranchIfZero(usize),
    /// ( limit start -- ) move loop parameters to the return stack
    Do,
    /// Like `Do`, but jump to the target when limit equals start
    QDo(usize),
    /// Increment and jump back to the body start unless the limit is reached
    Loop(usize),
    PlusLoop(usize),
    /// Drop loop parameters and jump past the loop
    Leave(usize),
    Exit,
    Print(Rc<str>),
}

#[derive(Debug, Clone)]
pub enum WordKind {
    Primitive(Prim),
    Colon(Rc<[Instr]>),
    Constant(Cell),
    Variable(u32),
}

#[derive(Debug, Clone)]
pub struct Word {
    pub name: String,
    pub kind: WordKind,
}

#[derive(Debug)]
pub struct Dictionary {
    words: Vec<Word>,
    index: FxHashMap<String, WordId>,
    used_cells: usize,
    capacity_cells: usize,
}

impl Dictionary {
    /// Build a dictionary holding every primitive, or `DictionaryFull` if
    /// `capacity_cells` cannot even hold those.
    pub fn with_primitives(capacity_cells: usize) -> Result<Self, ForthError> {
        let mut dict = Dictionary {
            words: Vec::with_capacity(PRIMITIVES.len() + 64),
            index: FxHashMap::default(),
            used_cells: 0,
            capacity_cells,
        };
        for (name, prim) in PRIMITIVES {
            dict.define(name, WordKind::Primitive(*prim))?;
        }
        Ok(dict)
    }

    /// Id the next `define` will return
    pub fn next_id(&self) -> WordId {
        self.words.len()
    }

    pub fn define(&mut self, name: &str, kind: WordKind) -> Result<WordId, ForthError> {
        let cost = HEADER_CELLS
            + match &kind {
                WordKind::Colon(code) => code.len(),
                _ => 1,
            };
        if self.used_cells + cost > self.capacity_cells {
            return Err(ForthError::DictionaryFull);
        }
        self.used_cells += cost;

        let id = self.words.len();
        let name = name.to_ascii_lowercase();
        self.index.insert(name.clone(), id);
        self.words.push(Word { name, kind });
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<WordId> {
        self.index.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn word(&self, id: WordId) -> &Word {
        &self.words[id]
    }

    /// Names visible to lookup, newest first
    pub fn visible_names(&self) -> Vec<&str> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .filter(|(id, w)| self.index.get(&w.name) == Some(id))
            .map(|(_, w)| w.name.as_str())
            .collect()
    }
}
