use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use bitvec::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

use chip8_rs::branch::{classify, BranchDescriptor};
use chip8_rs::decoder::{Decoder, Instruction};
use chip8_rs::isa::chip8::Chip8Decoder;

use crate::model::{is_mapped, read_u16, Image};

const ADDRESS_SPACE: usize = 0x1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeKind { Fallthrough, Branch, CondBranch, Call }

impl EdgeKind {
    pub fn tag(self) -> &'static str {
        match self {
            EdgeKind::Fallthrough => "ft",
            EdgeKind::Branch => "br",
            EdgeKind::CondBranch => "cbr",
            EdgeKind::Call => "call",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge { pub from: u16, pub to: u16, pub kind: EdgeKind }

/// Result of the worklist walk. Addresses are absolute (ROM base included).
#[derive(Debug, Clone)]
pub struct Analysis {
    /// One bit per address; set where a decoded instruction starts.
    pub visited: BitVec,
    pub edges: Vec<Edge>,
    /// Instructions after which control does not fall through.
    pub terminators: HashSet<u16>,
    pub rets: HashSet<u16>,
    /// `JP V0, addr` sites: successor unknown, never pruned.
    pub indirect: BTreeSet<u16>,
    /// Reached words that do not decode.
    pub data: BTreeSet<u16>,
    pub call_targets: BTreeSet<u16>,
}

impl Analysis {
    fn new() -> Self {
        Self {
            visited: bitvec![0; ADDRESS_SPACE],
            edges: Vec::new(),
            terminators: HashSet::new(),
            rets: HashSet::new(),
            indirect: BTreeSet::new(),
            data: BTreeSet::new(),
            call_targets: BTreeSet::new(),
        }
    }

    pub fn is_visited(&self, pc: u16) -> bool {
        self.visited.get(pc as usize).map_or(false, |b| *b)
    }

    /// Instruction addresses in ascending order.
    pub fn insns(&self) -> impl Iterator<Item = u16> + '_ {
        self.visited.iter_ones().map(|i| i as u16)
    }

    pub fn insn_count(&self) -> usize {
        self.visited.count_ones()
    }
}

fn link(img: &Image, a: &mut Analysis, queue: &mut VecDeque<u16>, from: u16, to: u16, kind: EdgeKind) {
    a.edges.push(Edge { from, to, kind });
    if is_mapped(img, to) && !a.is_visited(to) {
        queue.push_back(to);
    }
}

pub fn analyze_entries(img: &Image, entries: &[u16], max_instr: usize) -> Analysis {
    let dec = Chip8Decoder::new();
    let mut a = Analysis::new();
    let mut queue: VecDeque<u16> = VecDeque::new();
    for &e in entries { if is_mapped(img, e) { queue.push_back(e); } }
    let mut steps = 0usize;
    while let Some(pc) = queue.pop_front() {
        if steps >= max_instr {
            debug!(max_instr, pending = queue.len() + 1, "instruction budget exhausted");
            break;
        }
        if a.is_visited(pc) || a.data.contains(&pc) { continue; }
        let Some(word) = read_u16(img, pc) else { continue; };
        if dec.decode(word).is_none() {
            trace!(pc, word, "undecodable word reached");
            a.data.insert(pc);
            continue;
        }
        steps += 1;
        a.visited.set(pc as usize, true);

        let ft = pc.wrapping_add(Instruction::WIDTH);
        let branch = classify(word, pc);
        trace!(pc, word, ?branch, "decoded");
        match branch {
            BranchDescriptor::None => {
                if is_mapped(img, ft) { link(img, &mut a, &mut queue, pc, ft, EdgeKind::Fallthrough); }
            }
            BranchDescriptor::Unconditional { target } => {
                link(img, &mut a, &mut queue, pc, target, EdgeKind::Branch);
                a.terminators.insert(pc);
            }
            BranchDescriptor::Call { target } => {
                link(img, &mut a, &mut queue, pc, target, EdgeKind::Call);
                a.call_targets.insert(target);
                if is_mapped(img, ft) { link(img, &mut a, &mut queue, pc, ft, EdgeKind::Fallthrough); }
            }
            BranchDescriptor::ConditionalPair { true_target, false_target } => {
                link(img, &mut a, &mut queue, pc, true_target, EdgeKind::CondBranch);
                if is_mapped(img, false_target) {
                    link(img, &mut a, &mut queue, pc, false_target, EdgeKind::Fallthrough);
                }
                a.terminators.insert(pc);
            }
            BranchDescriptor::Return => {
                a.rets.insert(pc);
                a.terminators.insert(pc);
            }
            BranchDescriptor::Indirect => {
                a.indirect.insert(pc);
                a.terminators.insert(pc);
            }
        }
    }
    a
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block { pub start: u16, pub end: u16 }

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeOut { pub from: u16, pub to: u16, pub kind: String }

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionOut { pub entry: u16, pub blocks: Vec<u16> }

/// Basic blocks, block-level edges and functions derived from an `Analysis`.
#[derive(Debug, Clone)]
pub struct Cfg {
    pub blocks: Vec<Block>,
    pub edges: Vec<EdgeOut>,
    pub functions: Vec<FunctionOut>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report<Blk> {
    pub entries: Vec<u16>,
    pub blocks: Vec<Blk>,
    pub edges: Vec<EdgeOut>,
    pub functions: Vec<FunctionOut>,
    pub indirect: Vec<u16>,
    pub data: Vec<u16>,
}

pub fn build_cfg(a: &Analysis, seeds: &[u16]) -> Cfg {
    // Block starts: entries, branch/call targets, and the fall-through arm of skips
    let mut starts: BTreeSet<u16> = seeds.iter().copied().collect();
    for e in &a.edges {
        if e.kind != EdgeKind::Fallthrough || a.terminators.contains(&e.from) {
            starts.insert(e.to);
        }
    }
    starts.retain(|&s| a.is_visited(s));

    // Linear sweep from each start until a terminator, a gap, or the next start
    let mut blocks: Vec<Block> = Vec::new();
    let mut addr_to_block: HashMap<u16, u16> = HashMap::new();
    for &start in &starts {
        if addr_to_block.contains_key(&start) { continue; }
        let mut cur = start;
        loop {
            addr_to_block.insert(cur, start);
            let next = cur.wrapping_add(Instruction::WIDTH);
            if a.terminators.contains(&cur) || !a.is_visited(next) || starts.contains(&next) {
                blocks.push(Block { start, end: next });
                break;
            }
            cur = next;
        }
    }

    // Normalize edges to block level, dropping fall-through inside a block
    let mut edges: Vec<EdgeOut> = Vec::new();
    for e in &a.edges {
        if e.kind == EdgeKind::Fallthrough && !starts.contains(&e.to) { continue; }
        let from = *addr_to_block.get(&e.from).unwrap_or(&e.from);
        let out = EdgeOut { from, to: e.to, kind: e.kind.tag().to_string() };
        if !edges.contains(&out) { edges.push(out); }
    }

    // Functions: entries and call targets, reachable blocks without following calls
    let mut adj: HashMap<u16, Vec<u16>> = HashMap::new();
    for e in edges.iter().filter(|e| e.kind != EdgeKind::Call.tag()) {
        adj.entry(e.from).or_default().push(e.to);
    }
    let roots: BTreeSet<u16> = seeds.iter().chain(a.call_targets.iter()).copied()
        .filter(|&r| starts.contains(&r))
        .collect();
    let mut functions: Vec<FunctionOut> = Vec::new();
    for &entry in &roots {
        let mut seen: HashSet<u16> = HashSet::new();
        let mut q = VecDeque::from([entry]);
        while let Some(b) = q.pop_front() {
            if !seen.insert(b) { continue; }
            if let Some(nexts) = adj.get(&b) { q.extend(nexts.iter().copied()); }
        }
        let mut blks: Vec<u16> = seen.into_iter().filter(|b| starts.contains(b)).collect();
        blks.sort_unstable();
        functions.push(FunctionOut { entry, blocks: blks });
    }

    Cfg { blocks, edges, functions }
}
