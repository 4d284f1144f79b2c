//! Pseudo-instructions.
//!
//! A target-independent three-address form. Each value lives at a
//! [`Location`]: a segment plus a byte offset. The renderer collaborator turns
//! the stream into a concrete instruction set without needing any semantic
//! knowledge of the program.

use ordered_float::OrderedFloat;
use std::fmt;

/// Memory segment a [`Location`] is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Relative to the current frame pointer.
    FrameRelative,
    /// Relative to the global data pointer.
    GlobalRelative,
}

/// A variable or temporary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub segment: Segment,
    pub offset: i32,
    /// Source name or generated temporary name, for debugging output.
    pub name: String,
}

impl Location {
    pub fn frame(offset: i32, name: impl Into<String>) -> Self {
        Self {
            segment: Segment::FrameRelative,
            offset,
            name: name.into(),
        }
    }

    pub fn global(offset: i32, name: impl Into<String>) -> Self {
        Self {
            segment: Segment::GlobalRelative,
            offset,
            name: name.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Operations provided by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Alloc,
    ReadLine,
    ReadInteger,
    StringEqual,
    PrintInt,
    PrintString,
    PrintBool,
    Halt,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Alloc => "_Alloc",
            Builtin::ReadLine => "_ReadLine",
            Builtin::ReadInteger => "_ReadInteger",
            Builtin::StringEqual => "_StringEqual",
            Builtin::PrintInt => "_PrintInt",
            Builtin::PrintString => "_PrintString",
            Builtin::PrintBool => "_PrintBool",
            Builtin::Halt => "_Halt",
        }
    }

    /// Number of arguments the builtin takes.
    pub fn arity(self) -> usize {
        match self {
            Builtin::ReadLine | Builtin::ReadInteger | Builtin::Halt => 0,
            Builtin::Alloc | Builtin::PrintInt | Builtin::PrintString | Builtin::PrintBool => 1,
            Builtin::StringEqual => 2,
        }
    }

    /// Whether the builtin produces a value.
    pub fn has_result(self) -> bool {
        matches!(
            self,
            Builtin::Alloc | Builtin::ReadLine | Builtin::ReadInteger | Builtin::StringEqual
        )
    }
}

/// Operators a binary pseudo-instruction can carry.
///
/// The source-level operators without a counterpart here (`<=`, `>`, `>=`,
/// `!=`, unary `-` and `!`) are lowered to sequences of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TacOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Less,
    Equal,
    And,
    Or,
}

impl TacOp {
    pub fn symbol(self) -> &'static str {
        match self {
            TacOp::Add => "+",
            TacOp::Sub => "-",
            TacOp::Mul => "*",
            TacOp::Div => "/",
            TacOp::Mod => "%",
            TacOp::Less => "<",
            TacOp::Equal => "==",
            TacOp::And => "&&",
            TacOp::Or => "||",
        }
    }
}

/// One pseudo-instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instr {
    LoadConstant { dst: Location, value: i32 },
    LoadDouble { dst: Location, value: OrderedFloat<f64> },
    LoadString { dst: Location, value: String },
    LoadLabel { dst: Location, label: String },
    Assign { dst: Location, src: Location },
    /// `dst = *(base + offset)`
    Load { dst: Location, base: Location, offset: i32 },
    /// `*(base + offset) = src`
    Store { base: Location, offset: i32, src: Location },
    Binary { op: TacOp, dst: Location, lhs: Location, rhs: Location },
    Label(String),
    IfZ { test: Location, label: String },
    Goto(String),
    Return(Option<Location>),
    /// Function prologue; `frame_size` is an upper bound on the bytes of
    /// locals and temporaries the body needs.
    BeginFunc { frame_size: i32 },
    EndFunc,
    PushParam(Location),
    /// Pop `bytes` worth of pushed parameters.
    PopParams(i32),
    /// Call a label directly.
    LCall { label: String, dst: Option<Location> },
    /// Call through a computed address.
    ACall { addr: Location, dst: Option<Location> },
    BuiltinCall { builtin: Builtin, args: Vec<Location>, dst: Option<Location> },
    /// Method table of `class`, in slot order.
    VTable { class: String, methods: Vec<String> },
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::LoadConstant { dst, value } => write!(f, "\t{dst} = {value}"),
            Instr::LoadDouble { dst, value } => write!(f, "\t{dst} = {value}"),
            Instr::LoadString { dst, value } => write!(f, "\t{dst} = {value:?}"),
            Instr::LoadLabel { dst, label } => write!(f, "\t{dst} = {label}"),
            Instr::Assign { dst, src } => write!(f, "\t{dst} = {src}"),
            Instr::Load { dst, base, offset } => match offset {
                0 => write!(f, "\t{dst} = *({base})"),
                _ => write!(f, "\t{dst} = *({base} + {offset})"),
            },
            Instr::Store { base, offset, src } => match offset {
                0 => write!(f, "\t*({base}) = {src}"),
                _ => write!(f, "\t*({base} + {offset}) = {src}"),
            },
            Instr::Binary { op, dst, lhs, rhs } => {
                write!(f, "\t{dst} = {lhs} {} {rhs}", op.symbol())
            }
            Instr::Label(label) => write!(f, "{label}:"),
            Instr::IfZ { test, label } => write!(f, "\tIfZ {test} Goto {label}"),
            Instr::Goto(label) => write!(f, "\tGoto {label}"),
            Instr::Return(Some(value)) => write!(f, "\tReturn {value}"),
            Instr::Return(None) => write!(f, "\tReturn"),
            Instr::BeginFunc { frame_size } => write!(f, "\tBeginFunc {frame_size}"),
            Instr::EndFunc => write!(f, "\tEndFunc"),
            Instr::PushParam(loc) => write!(f, "\tPushParam {loc}"),
            Instr::PopParams(bytes) => write!(f, "\tPopParams {bytes}"),
            Instr::LCall { label, dst } => match dst {
                Some(dst) => write!(f, "\t{dst} = LCall {label}"),
                None => write!(f, "\tLCall {label}"),
            },
            Instr::ACall { addr, dst } => match dst {
                Some(dst) => write!(f, "\t{dst} = ACall {addr}"),
                None => write!(f, "\tACall {addr}"),
            },
            Instr::BuiltinCall { builtin, args, dst } => {
                f.write_str("\t")?;
                if let Some(dst) = dst {
                    write!(f, "{dst} = ")?;
                }
                write!(f, "LCall {}", builtin.name())?;
                for (i, arg) in args.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{arg}")?;
                }
                Ok(())
            }
            Instr::VTable { class, methods } => {
                writeln!(f, "VTable {class} =")?;
                for method in methods {
                    writeln!(f, "\t{method},")?;
                }
                write!(f, "; ")
            }
        }
    }
}

/// A per-class method table, also present in the stream as [`Instr::VTable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VTableDef {
    pub class: String,
    pub methods: Vec<String>,
}
