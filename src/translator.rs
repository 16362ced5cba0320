use log::trace;

use crate::ast::{
    check_arg_count, ArithmeticOp, Command, Direction, Segment, SourceCommand, FRAME_SIZE,
};
use crate::error::{CommandError, LineError};

/// Address the stack starts at after bootstrap.
pub const STACK_BASE: u16 = 256;

/// Function the bootstrap code hands control to.
pub const ENTRY_POINT: &str = "Sys.init";

/// First RAM cell of the temp segment.
const TEMP_BASE: u16 = 5;

macro_rules! svec {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

fn at<T: std::fmt::Display>(arg: T) -> String {
    format!("@{}", arg)
}

fn declare(label: &str) -> String {
    format!("({})", label)
}

/// Pushes the D register
fn push_d() -> Vec<String> {
    svec!["@SP", "M=M+1", "A=M-1", "M=D"]
}

/// Pops into the D register
fn pop_d() -> Vec<String> {
    svec!["@SP", "AM=M-1", "D=M"]
}

fn base_register(segment: Segment) -> Option<&'static str> {
    match segment {
        Segment::Local => Some("LCL"),
        Segment::Argument => Some("ARG"),
        Segment::This => Some("THIS"),
        Segment::That => Some("THAT"),
        _ => None,
    }
}

fn pointer_register(index: u16) -> &'static str {
    if index == 0 {
        "THIS"
    } else {
        "THAT"
    }
}

fn simple_un_op(op: char) -> Vec<String> {
    svec!["@SP", "A=M-1", format!("M={}M", op)]
}

/// Combines the top two cells in place: y into D, result over x
fn simple_bin_op(comp: &str) -> Vec<String> {
    svec![
        "@SP",
        "AM=M-1", // pop y
        "D=M",
        "A=A-1", // x stays put and takes the result
        format!("M={}", comp)
    ]
}

/// The three operators that branch on `x - y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Eq,
    Gt,
    Lt,
}

impl Comparison {
    fn prefix(self) -> &'static str {
        match self {
            Comparison::Eq => "EQ",
            Comparison::Gt => "GT",
            Comparison::Lt => "LT",
        }
    }

    fn jump(self) -> &'static str {
        match self {
            Comparison::Eq => "JEQ",
            Comparison::Gt => "JGT",
            Comparison::Lt => "JLT",
        }
    }
}

/// Per-output counters used to keep generated labels unique.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelCounters {
    pub eq: usize,
    pub gt: usize,
    pub lt: usize,
    pub call: usize,
}

impl LabelCounters {
    fn next_compare(&mut self, cmp: Comparison) -> usize {
        let counter = match cmp {
            Comparison::Eq => &mut self.eq,
            Comparison::Gt => &mut self.gt,
            Comparison::Lt => &mut self.lt,
        };
        let n = *counter;
        *counter += 1;
        n
    }

    fn next_call(&mut self) -> usize {
        let n = self.call;
        self.call += 1;
        n
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorOptions {
    /// Precede each command's instructions with a `// <command>` line.
    pub echo_commands: bool,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        TranslatorOptions {
            echo_commands: true,
        }
    }
}

/// Turns commands into Hack assembly, one command at a time.
///
/// One `Translator` covers one output stream. Label counters are never
/// reset, so several units can be translated through the same instance
/// without their generated labels colliding.
pub struct Translator {
    unit: String,
    counters: LabelCounters,
    options: TranslatorOptions,
    out: Vec<String>,
}

impl Default for Translator {
    fn default() -> Self {
        Translator::new(TranslatorOptions::default())
    }
}

impl Translator {
    pub fn new(options: TranslatorOptions) -> Self {
        Translator {
            unit: String::new(),
            counters: LabelCounters::default(),
            options,
            out: vec![],
        }
    }

    /// Names the unit whose commands follow; static cells are namespaced by it.
    pub fn set_unit(&mut self, unit: &str) {
        self.unit = unit.to_string();
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn counters(&self) -> &LabelCounters {
        &self.counters
    }

    pub fn instructions(&self) -> &[String] {
        &self.out
    }

    pub fn into_instructions(self) -> Vec<String> {
        self.out
    }

    fn emit(&mut self, lines: Vec<String>) {
        self.out.extend(lines);
    }

    fn echo(&mut self, text: String) {
        if self.options.echo_commands {
            self.out.push(format!("// {}", text));
        }
    }

    /// Sets SP to the stack base and calls the entry point.
    pub fn bootstrap(&mut self) {
        self.echo("bootstrap".to_string());
        self.emit(svec![at(STACK_BASE), "D=A", "@SP", "M=D"]);
        self.echo(format!("call {} 0", ENTRY_POINT));
        let code = self.call(ENTRY_POINT, 0);
        self.emit(code);
    }

    /// Appends the instructions for one command.
    pub fn translate(&mut self, command: &Command) -> Result<(), CommandError> {
        trace!("{}: {}", self.unit, command);

        let code = match command {
            Command::Arithmetic(op) => self.arithmetic(*op),
            Command::Push(seg, index) => self.push(*seg, *index)?,
            Command::Pop(seg, index) => self.pop(*seg, *index)?,
            Command::Label(label) => svec![declare(label)],
            Command::Goto(label) => svec![at(label), "0;JMP"],
            Command::IfGoto(label) => {
                let mut code = pop_d();
                code.extend(svec![at(label), "D;JNE"]); // False is 0
                code
            }
            Command::Function(name, locals) => function(name, *locals),
            Command::Call(name, args) => {
                check_arg_count(*args)?;
                self.call(name, *args)
            }
            Command::Return => ret(),
        };

        self.echo(command.to_string());
        self.emit(code);
        Ok(())
    }

    /// Translates a whole unit, stopping at the first command that fails.
    pub fn translate_all(&mut self, commands: &[SourceCommand]) -> Result<(), LineError> {
        for source in commands {
            self.translate(&source.command).map_err(|err| LineError {
                line: source.line,
                text: source.text.clone(),
                source: err,
            })?;
        }
        Ok(())
    }

    fn arithmetic(&mut self, op: ArithmeticOp) -> Vec<String> {
        match op {
            ArithmeticOp::Add => simple_bin_op("D+M"),
            ArithmeticOp::Sub => simple_bin_op("M-D"),
            ArithmeticOp::And => simple_bin_op("D&M"),
            ArithmeticOp::Or => simple_bin_op("D|M"),
            ArithmeticOp::Neg => simple_un_op('-'),
            ArithmeticOp::Not => simple_un_op('!'),
            ArithmeticOp::Eq => self.compare(Comparison::Eq),
            ArithmeticOp::Gt => self.compare(Comparison::Gt),
            ArithmeticOp::Lt => self.compare(Comparison::Lt),
        }
    }

    fn compare(&mut self, cmp: Comparison) -> Vec<String> {
        let n = self.counters.next_compare(cmp);
        let true_sym = format!("{}.{}$TRUE", cmp.prefix(), n);
        let end_sym = format!("{}.{}$END", cmp.prefix(), n);
        svec![
            "@SP",
            "AM=M-1", // pop y
            "D=M",
            "A=A-1",
            "D=M-D", // x - y
            at(&true_sym),
            format!("D;{}", cmp.jump()),
            "D=0",
            at(&end_sym),
            "0;JMP",
            declare(&true_sym),
            "D=-1",
            declare(&end_sym),
            "@SP",
            "A=M-1",
            "M=D"
        ]
    }

    /// Symbol of a cell addressed directly rather than through a base register.
    fn direct_symbol(&self, segment: Segment, index: u16) -> Option<String> {
        match segment {
            Segment::Static => Some(format!("{}.{}", self.unit, index)),
            Segment::Temp => Some(format!("R{}", TEMP_BASE + index)),
            Segment::Pointer => Some(pointer_register(index).to_string()),
            _ => None,
        }
    }

    fn push(&self, segment: Segment, index: u16) -> Result<Vec<String>, CommandError> {
        segment.check_index(Direction::Push, index)?;

        let mut code = if segment == Segment::Constant {
            svec![at(index), "D=A"]
        } else if let Some(base) = base_register(segment) {
            svec![
                at(base),
                "D=M",
                at(index),
                "A=D+A", // A = SEG+index
                "D=M"    // D = value to push
            ]
        } else {
            let symbol = self.direct_symbol(segment, index).ok_or_else(|| {
                CommandError::InvalidOperand(format!("cannot push from {}", segment))
            })?;
            svec![at(symbol), "D=M"]
        };

        code.extend(push_d());
        Ok(code)
    }

    fn pop(&self, segment: Segment, index: u16) -> Result<Vec<String>, CommandError> {
        segment.check_index(Direction::Pop, index)?;

        if let Some(base) = base_register(segment) {
            let mut code = svec![
                at(base),
                "D=M",
                at(index),
                "D=D+A", // D = SEG+index
                "@R13",
                "M=D" // Store target addr in R13
            ];
            code.extend(pop_d());
            code.extend(svec![
                "@R13",
                "A=M", // At the target address...
                "M=D"  // ... store the popped val
            ]);
            return Ok(code);
        }

        let symbol = self
            .direct_symbol(segment, index)
            .ok_or_else(|| CommandError::InvalidOperand(format!("cannot pop into {}", segment)))?;
        let mut code = pop_d();
        code.extend(svec![at(symbol), "M=D"]);
        Ok(code)
    }

    fn call(&mut self, callee: &str, args: u16) -> Vec<String> {
        let ret_sym = format!("{}$Ret.{}", callee, self.counters.next_call());

        let mut code = svec![at(&ret_sym), "D=A"];
        code.extend(push_d());
        for register in ["LCL", "ARG", "THIS", "THAT"] {
            code.extend(svec![at(register), "D=M"]);
            code.extend(push_d());
        }
        code.extend(svec![
            // ARG = SP - 5 - args
            "@SP",
            "D=M",
            at(FRAME_SIZE as u32 + args as u32),
            "D=D-A",
            "@ARG",
            "M=D",
            // LCL = SP
            "@SP",
            "D=M",
            "@LCL",
            "M=D",
            at(callee),
            "0;JMP",
            declare(&ret_sym)
        ]);
        code
    }
}

fn function(name: &str, locals: u16) -> Vec<String> {
    let mut code = svec![declare(name)];
    for _ in 0..locals {
        code.extend(svec!["@SP", "M=M+1", "A=M-1", "M=0"]);
    }
    code
}

fn ret() -> Vec<String> {
    let mut code = svec![
        // R13 = frame base
        "@LCL",
        "D=M",
        "@R13",
        "M=D",
        // R14 = return address, read before *ARG may overwrite it
        at(FRAME_SIZE),
        "A=D-A",
        "D=M",
        "@R14",
        "M=D"
    ];
    code.extend(pop_d());
    code.extend(svec![
        "@ARG",
        "A=M",
        "M=D", // *ARG = return value
        "@ARG",
        "D=M+1",
        "@SP",
        "M=D" // SP = ARG + 1
    ]);
    // Reverse push order, R13 walking down from the frame base
    for register in ["THAT", "THIS", "ARG", "LCL"] {
        code.extend(svec!["@R13", "AM=M-1", "D=M", at(register), "M=D"]);
    }
    code.extend(svec!["@R14", "A=M", "0;JMP"]);
    code
}
