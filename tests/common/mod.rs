//! A minimal Hack assembler and CPU, enough to execute translator output.
#![allow(dead_code)]

use std::collections::HashMap;

use hack_vm_translator::{translate_sources, TranslatorOptions};

const RAM_SIZE: usize = 32768;
const FIRST_VARIABLE: u16 = 16;

#[derive(Debug, Clone)]
enum Instr {
    A(u16),
    C {
        dest: String,
        comp: String,
        jump: String,
    },
}

pub struct Program {
    code: Vec<Instr>,
    pub symbols: HashMap<String, u16>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn address(&self, symbol: &str) -> u16 {
        *self
            .symbols
            .get(symbol)
            .unwrap_or_else(|| panic!("unknown symbol {}", symbol))
    }
}

fn predefined() -> HashMap<String, u16> {
    let mut symbols = HashMap::new();
    for (i, name) in ["SP", "LCL", "ARG", "THIS", "THAT"].iter().enumerate() {
        symbols.insert(name.to_string(), i as u16);
    }
    for i in 0..16u16 {
        symbols.insert(format!("R{}", i), i);
    }
    symbols.insert("SCREEN".to_string(), 16384);
    symbols.insert("KBD".to_string(), 24576);
    symbols
}

pub fn assemble(lines: &[String]) -> Program {
    let mut symbols = predefined();
    let mut body = vec![];

    for line in lines {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('(') && line.ends_with(')') {
            let label = &line[1..line.len() - 1];
            assert!(
                symbols.insert(label.to_string(), body.len() as u16).is_none(),
                "label {} declared twice",
                label
            );
        } else {
            body.push(line.to_string());
        }
    }

    let mut next_variable = FIRST_VARIABLE;
    let mut code = vec![];
    for line in body {
        if let Some(operand) = line.strip_prefix('@') {
            let value = match operand.parse::<u16>() {
                Ok(n) => n,
                Err(_) => *symbols.entry(operand.to_string()).or_insert_with(|| {
                    let addr = next_variable;
                    next_variable += 1;
                    addr
                }),
            };
            code.push(Instr::A(value));
        } else {
            let (dest, rest) = match line.split_once('=') {
                Some((dest, rest)) => (dest.to_string(), rest),
                None => (String::new(), line.as_str()),
            };
            let (comp, jump) = match rest.split_once(';') {
                Some((comp, jump)) => (comp.to_string(), jump.to_string()),
                None => (rest.to_string(), String::new()),
            };
            code.push(Instr::C { dest, comp, jump });
        }
    }

    Program { code, symbols }
}

pub struct Cpu {
    pub ram: Vec<i16>,
    a: i16,
    d: i16,
    pc: usize,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    pub fn sp(&self) -> i16 {
        self.ram[0]
    }

    /// Points SP, LCL, ARG, THIS and THAT at the given addresses.
    pub fn set_registers(&mut self, registers: [i16; 5]) {
        self.ram[..5].copy_from_slice(&registers);
    }

    pub fn registers(&self) -> [i16; 5] {
        [self.ram[0], self.ram[1], self.ram[2], self.ram[3], self.ram[4]]
    }

    fn m_addr(&self) -> usize {
        (self.a as u16 as usize) % RAM_SIZE
    }

    fn comp(&self, comp: &str) -> i16 {
        let (a, d, m) = (self.a, self.d, self.ram[self.m_addr()]);
        match comp {
            "0" => 0,
            "1" => 1,
            "-1" => -1,
            "D" => d,
            "A" => a,
            "M" => m,
            "!D" => !d,
            "!A" => !a,
            "!M" => !m,
            "-D" => d.wrapping_neg(),
            "-A" => a.wrapping_neg(),
            "-M" => m.wrapping_neg(),
            "D+1" => d.wrapping_add(1),
            "A+1" => a.wrapping_add(1),
            "M+1" => m.wrapping_add(1),
            "D-1" => d.wrapping_sub(1),
            "A-1" => a.wrapping_sub(1),
            "M-1" => m.wrapping_sub(1),
            "D+A" => d.wrapping_add(a),
            "D+M" => d.wrapping_add(m),
            "D-A" => d.wrapping_sub(a),
            "D-M" => d.wrapping_sub(m),
            "A-D" => a.wrapping_sub(d),
            "M-D" => m.wrapping_sub(d),
            "D&A" => d & a,
            "D&M" => d & m,
            "D|A" => d | a,
            "D|M" => d | m,
            other => panic!("not a Hack computation: {}", other),
        }
    }

    fn step(&mut self, program: &Program) {
        match &program.code[self.pc] {
            Instr::A(value) => {
                self.a = *value as i16;
                self.pc += 1;
            }
            Instr::C { dest, comp, jump } => {
                let value = self.comp(comp);
                let target = self.a as u16 as usize;
                let addr = self.m_addr();
                if dest.contains('M') {
                    self.ram[addr] = value;
                }
                if dest.contains('A') {
                    self.a = value;
                }
                if dest.contains('D') {
                    self.d = value;
                }
                let taken = match jump.as_str() {
                    "" => false,
                    "JGT" => value > 0,
                    "JEQ" => value == 0,
                    "JGE" => value >= 0,
                    "JLT" => value < 0,
                    "JNE" => value != 0,
                    "JLE" => value <= 0,
                    "JMP" => true,
                    other => panic!("not a Hack jump: {}", other),
                };
                self.pc = if taken { target } else { self.pc + 1 };
            }
        }
    }

    /// Executes from the current instruction until control reaches `label`.
    pub fn run_until(&mut self, program: &Program, label: &str, max_steps: usize) {
        let stop = program.address(label) as usize;
        for _ in 0..max_steps {
            if self.pc == stop {
                return;
            }
            assert!(self.pc < program.len(), "ran off the end of the program");
            self.step(program);
        }
        panic!("did not reach {} within {} steps", label, max_steps);
    }
}

/// Translates a single unit without bootstrap.
pub fn translate_unit(unit: &str, source: &str) -> Vec<String> {
    translate_units(&[(unit, source)], false)
}

pub fn translate_units(units: &[(&str, &str)], bootstrap: bool) -> Vec<String> {
    let sources: Vec<(String, String)> = units
        .iter()
        .map(|(unit, text)| (unit.to_string(), text.to_string()))
        .collect();
    translate_sources(&sources, bootstrap, TranslatorOptions::default()).unwrap()
}
