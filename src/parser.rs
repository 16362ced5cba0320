use nom::{
    branch::alt,
    bytes::complete::{is_a, is_not, tag},
    character::{
        complete::{digit1, space1},
        is_digit,
    },
    combinator::{all_consuming, map, map_res, value, verify},
    multi::separated_list1,
    IResult,
};

use crate::ast::{check_arg_count, ArithmeticOp, Command, Direction, Segment, SourceCommand};
use crate::error::{CommandError, LineError};

const SYMBOL_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_.$:0123456789";

fn integer(input: &str) -> IResult<&str, u16> {
    map_res(digit1, |c: &str| c.parse())(input)
}

fn symbol(input: &str) -> IResult<&str, String> {
    map(
        verify(is_a(SYMBOL_CHARS), |c: &str| !is_digit(c.as_bytes()[0])),
        |sym: &str| sym.to_string(),
    )(input)
}

fn operator(input: &str) -> IResult<&str, ArithmeticOp> {
    alt((
        value(ArithmeticOp::Add, tag("add")),
        value(ArithmeticOp::Sub, tag("sub")),
        value(ArithmeticOp::Neg, tag("neg")),
        value(ArithmeticOp::Eq, tag("eq")),
        value(ArithmeticOp::Gt, tag("gt")),
        value(ArithmeticOp::Lt, tag("lt")),
        value(ArithmeticOp::And, tag("and")),
        value(ArithmeticOp::Or, tag("or")),
        value(ArithmeticOp::Not, tag("not")),
    ))(input)
}

/// Splits a cleaned line into its whitespace-separated words.
fn tokens(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(space1, is_not(" \t"))(input)
}

/// Runs `parser` over a whole word; trailing junk is a failure.
fn whole<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
    word: &'a str,
) -> Option<O> {
    all_consuming(parser)(word).ok().map(|(_, out)| out)
}

fn parse_index(word: &str) -> Result<u16, CommandError> {
    whole(integer, word).ok_or_else(|| {
        CommandError::Malformed(format!(
            "expected a non-negative integer no larger than {}, found `{}`",
            u16::MAX,
            word
        ))
    })
}

fn parse_symbol(word: &str) -> Result<String, CommandError> {
    whole(symbol, word)
        .ok_or_else(|| CommandError::Malformed(format!("`{}` is not a valid symbol", word)))
}

fn expect_words(words: &[&str], count: usize) -> Result<(), CommandError> {
    if words.len() == count {
        Ok(())
    } else {
        Err(CommandError::Malformed(format!(
            "`{}` takes {} operand(s), found {}",
            words[0],
            count - 1,
            words.len() - 1
        )))
    }
}

fn transfer(direction: Direction, words: &[&str]) -> Result<Command, CommandError> {
    expect_words(words, 3)?;
    let segment: Segment = words[1].parse()?;
    let index = parse_index(words[2])?;
    segment.check_index(direction, index)?;
    Ok(match direction {
        Direction::Push => Command::Push(segment, index),
        Direction::Pop => Command::Pop(segment, index),
    })
}

/// Removes any `//` comment and surrounding whitespace. Returns `None` for
/// lines with nothing left to classify.
pub fn clean_line(line: &str) -> Option<&str> {
    let line = line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Classifies one cleaned line into a [`Command`].
pub fn classify(line: &str) -> Result<Command, CommandError> {
    let words = whole(tokens, line.trim())
        .ok_or_else(|| CommandError::Malformed("empty command".to_string()))?;

    match words[0] {
        "push" => transfer(Direction::Push, &words),
        "pop" => transfer(Direction::Pop, &words),
        "label" => {
            expect_words(&words, 2)?;
            Ok(Command::Label(parse_symbol(words[1])?))
        }
        "goto" => {
            expect_words(&words, 2)?;
            Ok(Command::Goto(parse_symbol(words[1])?))
        }
        "if-goto" => {
            expect_words(&words, 2)?;
            Ok(Command::IfGoto(parse_symbol(words[1])?))
        }
        "function" => {
            expect_words(&words, 3)?;
            Ok(Command::Function(
                parse_symbol(words[1])?,
                parse_index(words[2])?,
            ))
        }
        "call" => {
            expect_words(&words, 3)?;
            let name = parse_symbol(words[1])?;
            let args = parse_index(words[2])?;
            check_arg_count(args)?;
            Ok(Command::Call(name, args))
        }
        "return" => {
            expect_words(&words, 1)?;
            Ok(Command::Return)
        }
        other => {
            let op = whole(operator, other).ok_or_else(|| {
                CommandError::Malformed(format!("unknown command `{}`", other))
            })?;
            expect_words(&words, 1)?;
            Ok(Command::Arithmetic(op))
        }
    }
}

/// Classifies every non-blank line of a source unit, stopping at the first
/// bad one.
pub fn parse(input: &str) -> Result<Vec<SourceCommand>, LineError> {
    let mut commands = vec![];

    for (number, raw) in input.lines().enumerate() {
        let Some(text) = clean_line(raw) else {
            continue;
        };

        let command = classify(text).map_err(|source| LineError {
            line: number + 1,
            text: text.to_string(),
            source,
        })?;

        commands.push(SourceCommand {
            line: number + 1,
            text: text.to_string(),
            command,
        });
    }

    Ok(commands)
}
