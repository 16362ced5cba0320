use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// Largest value a Hack A-instruction can load as an immediate.
pub const MAX_CONSTANT: u16 = 32767;

/// Number of cells in the temp segment (R5..R12).
pub const TEMP_SIZE: u16 = 8;

/// Cells saved by a call: return address, LCL, ARG, THIS, THAT.
pub const FRAME_SIZE: u16 = 5;

/// Checks that a call's argument count still fits the `@SP-5-n` offset.
pub fn check_arg_count(args: u16) -> Result<(), CommandError> {
    if args > MAX_CONSTANT - FRAME_SIZE {
        Err(CommandError::InvalidOperand(format!(
            "call with {} arguments exceeds {}",
            args,
            MAX_CONSTANT - FRAME_SIZE
        )))
    } else {
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }

    /// Checks that `index` addresses a real cell of this segment for the
    /// given transfer direction.
    pub fn check_index(self, direction: Direction, index: u16) -> Result<(), CommandError> {
        match (self, direction) {
            (Segment::Constant, Direction::Pop) => Err(CommandError::InvalidOperand(
                "cannot pop into the constant segment".to_string(),
            )),
            (Segment::Constant, Direction::Push) if index > MAX_CONSTANT => {
                Err(CommandError::InvalidOperand(format!(
                    "constant {} exceeds {}",
                    index, MAX_CONSTANT
                )))
            }
            (Segment::Pointer, _) if index > 1 => Err(CommandError::InvalidOperand(format!(
                "pointer index must be 0 or 1, got {}",
                index
            ))),
            (Segment::Temp, _) if index >= TEMP_SIZE => Err(CommandError::InvalidOperand(
                format!("temp index must be in 0..={}, got {}", TEMP_SIZE - 1, index),
            )),
            (Segment::Local | Segment::Argument | Segment::This | Segment::That, _)
                if index > MAX_CONSTANT =>
            {
                Err(CommandError::InvalidOperand(format!(
                    "{} index {} exceeds {}",
                    self, index, MAX_CONSTANT
                )))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for Segment {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Segment::Constant),
            "local" => Ok(Segment::Local),
            "static" => Ok(Segment::Static),
            "argument" => Ok(Segment::Argument),
            "this" => Ok(Segment::This),
            "that" => Ok(Segment::That),
            "pointer" => Ok(Segment::Pointer),
            "temp" => Ok(Segment::Temp),
            _ => Err(CommandError::InvalidOperand(format!("unknown segment `{}`", s))),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Push,
    Pop,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub fn name(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandKind {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    IfGoto,
    Function,
    Call,
    Return,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    // Stack
    Arithmetic(ArithmeticOp),
    Push(Segment, u16),
    Pop(Segment, u16),

    // Branching
    Label(String),
    Goto(String),
    IfGoto(String),

    // Functions
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Arithmetic(_) => CommandKind::Arithmetic,
            Command::Push(..) => CommandKind::Push,
            Command::Pop(..) => CommandKind::Pop,
            Command::Label(_) => CommandKind::Label,
            Command::Goto(_) => CommandKind::Goto,
            Command::IfGoto(_) => CommandKind::IfGoto,
            Command::Function(..) => CommandKind::Function,
            Command::Call(..) => CommandKind::Call,
            Command::Return => CommandKind::Return,
        }
    }

    /// The primary operand: operator, segment, label or function name.
    /// `None` for `return`.
    pub fn arg1(&self) -> Option<&str> {
        match self {
            Command::Arithmetic(op) => Some(op.name()),
            Command::Push(seg, _) | Command::Pop(seg, _) => Some(seg.name()),
            Command::Label(name)
            | Command::Goto(name)
            | Command::IfGoto(name)
            | Command::Function(name, _)
            | Command::Call(name, _) => Some(name.as_str()),
            Command::Return => None,
        }
    }

    /// The integer operand: segment index, local count or argument count.
    pub fn arg2(&self) -> Option<u16> {
        match self {
            Command::Push(_, n)
            | Command::Pop(_, n)
            | Command::Function(_, n)
            | Command::Call(_, n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{}", op),
            Command::Push(seg, n) => write!(f, "push {} {}", seg, n),
            Command::Pop(seg, n) => write!(f, "pop {} {}", seg, n),
            Command::Label(name) => write!(f, "label {}", name),
            Command::Goto(name) => write!(f, "goto {}", name),
            Command::IfGoto(name) => write!(f, "if-goto {}", name),
            Command::Function(name, locals) => write!(f, "function {} {}", name, locals),
            Command::Call(name, args) => write!(f, "call {} {}", name, args),
            Command::Return => f.write_str("return"),
        }
    }
}

/// A classified command together with where it came from.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SourceCommand {
    /// 1-based line number in the source unit.
    pub line: usize,
    /// The line with comments and surrounding whitespace removed.
    pub text: String,
    pub command: Command,
}

#[test]
fn test_accessors() {
    let call = Command::Call("Math.max".to_string(), 2);
    assert_eq!(call.kind(), CommandKind::Call);
    assert_eq!(call.arg1(), Some("Math.max"));
    assert_eq!(call.arg2(), Some(2));

    assert_eq!(Command::Return.arg1(), None);
    assert_eq!(Command::Return.arg2(), None);
    assert_eq!(Command::Arithmetic(ArithmeticOp::Lt).arg1(), Some("lt"));
    assert_eq!(Command::Goto("LOOP".to_string()).arg2(), None);
}

#[test]
fn test_check_index() {
    assert!(Segment::Pointer.check_index(Direction::Push, 1).is_ok());
    assert!(Segment::Pointer.check_index(Direction::Pop, 2).is_err());
    assert!(Segment::Temp.check_index(Direction::Pop, 7).is_ok());
    assert!(Segment::Temp.check_index(Direction::Push, 8).is_err());
    assert!(Segment::Constant.check_index(Direction::Pop, 0).is_err());
    assert!(Segment::Constant.check_index(Direction::Push, 32768).is_err());
    assert!(Segment::Local.check_index(Direction::Pop, 500).is_ok());
    assert!(Segment::Local.check_index(Direction::Push, 32767).is_ok());
    assert!(Segment::Local.check_index(Direction::Push, 40000).is_err());
    assert!(Segment::Argument.check_index(Direction::Pop, 32768).is_err());
    assert!(Segment::That.check_index(Direction::Pop, 32768).is_err());
    assert!(Segment::Static.check_index(Direction::Pop, 40000).is_ok());
}

#[test]
fn test_check_arg_count() {
    assert!(check_arg_count(0).is_ok());
    assert!(check_arg_count(32762).is_ok());
    assert!(matches!(
        check_arg_count(32763),
        Err(CommandError::InvalidOperand(_))
    ));
}
