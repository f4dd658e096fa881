//! The typed SSA-like IR: every [`Inst`] produces at most one [`ValueId`],
//! every value has a known type (or none, for void-producing ops), and
//! control flow is explicit basic blocks ending in a single [`Terminator`].

use crate::hir::types::HirType;
use crate::parser::ast::{BinOp, BorrowKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// An operation producing zero or one SSA value. Ops that the emitter
/// maps straight onto a runtime symbol (buffer/view/tensor/channel
/// create-release, result/option helpers) are kept as distinct variants
/// rather than folded into a generic `Call`, so `emit::c_emitter` can
/// match on them without re-parsing callee names.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    ConstInt(i64),
    ConstBool(bool),
    ConstStr(String),
    /// A reference to a value already bound earlier in the function
    /// (a parameter or a prior instruction's result).
    Use(ValueId),
    BinOp {
        op: BinOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    Call {
        callee: String,
        args: Vec<ValueId>,
    },
    BufferCreate {
        size: ValueId,
    },
    BufferRelease {
        buffer: ValueId,
    },
    ViewBorrow {
        buffer: ValueId,
        start: ValueId,
        end: ValueId,
        kind: BorrowKind,
    },
    ViewRelease {
        view: ValueId,
    },
    TensorCreate {
        rows: ValueId,
        cols: ValueId,
    },
    TensorMatmul {
        lhs: ValueId,
        rhs: ValueId,
    },
    ChannelSend {
        channel: ValueId,
        value: ValueId,
    },
    ChannelRecv {
        channel: ValueId,
    },
    ResultOk {
        value: ValueId,
    },
    ResultErr {
        value: ValueId,
    },
    ResultIsOk {
        value: ValueId,
    },
    ResultUnwrap {
        value: ValueId,
    },
    OptionSome {
        value: ValueId,
    },
    OptionNone,
    OptionIsSome {
        value: ValueId,
    },
    OptionUnwrap {
        value: ValueId,
    },
    StructInit {
        name: String,
        fields: Vec<(String, ValueId)>,
    },
    EnumInit {
        name: String,
        variant: String,
        args: Vec<ValueId>,
    },
    /// Merges values coming from distinct predecessor blocks into one,
    /// standard SSA join at a control-flow merge point.
    Phi {
        incoming: Vec<(BlockId, ValueId)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub id: ValueId,
    /// `None` for ops with no result type worth tracking (releases).
    pub ty: Option<HirType>,
    pub op: Op,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Jump(BlockId),
    Branch {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Return(Option<ValueId>),
    /// Reached when borrow-checked code still hits an exhaustiveness gap
    /// the checker should already have rejected; kept so lowering never
    /// needs to produce a block with no terminator.
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub insts: Vec<Inst>,
    pub terminator: Terminator,
}

impl Block {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            insts: Vec::new(),
            terminator: Terminator::Unreachable,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<(String, HirType)>,
    pub return_type: Option<HirType>,
    pub blocks: Vec<Block>,
    pub entry: BlockId,
}

impl Function {
    pub fn block(&self, id: BlockId) -> &Block {
        self.blocks
            .iter()
            .find(|b| b.id == id)
            .expect("block id always refers to a block created by the same builder")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub functions: Vec<Function>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_new_starts_unreachable() {
        let block = Block::new(BlockId(0));
        assert_eq!(block.terminator, Terminator::Unreachable);
        assert!(block.insts.is_empty());
    }

    #[test]
    fn function_block_looks_up_by_id() {
        let mut entry = Block::new(BlockId(0));
        entry.terminator = Terminator::Return(None);
        let f = Function {
            name: "main".into(),
            params: vec![],
            return_type: None,
            blocks: vec![entry],
            entry: BlockId(0),
        };
        assert_eq!(f.block(BlockId(0)).terminator, Terminator::Return(None));
    }
}
