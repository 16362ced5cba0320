mod common;

use std::collections::HashSet;

use common::translate_units;
use hack_vm_translator::{translate_sources, TranslatorOptions};
use pretty_assertions::assert_eq;

fn declared_labels(code: &[String]) -> Vec<&str> {
    code.iter()
        .filter(|line| line.starts_with('('))
        .map(String::as_str)
        .collect()
}

#[test]
fn generated_labels_never_repeat_across_units() {
    let unit = "\
function Util.cmp 0
push argument 0
push argument 1
eq
push argument 0
push argument 1
eq
lt
call Util.cmp 2
return
";
    let code = translate_units(&[("A", unit), ("B", unit), ("C", unit)], true);
    let labels = declared_labels(&code);

    // Function labels repeat because the same body is reused; everything
    // the translator generates must not.
    let generated: Vec<&str> = labels
        .iter()
        .copied()
        .filter(|l| l.contains('$'))
        .collect();
    let unique: HashSet<&str> = generated.iter().copied().collect();
    assert_eq!(unique.len(), generated.len());

    let eq_pairs = generated.iter().filter(|l| l.starts_with("(EQ.")).count();
    assert_eq!(eq_pairs, 2 * 6);
    assert!(unique.contains("(EQ.5$TRUE)"));
    assert!(unique.contains("(LT.2$END)"));
    assert!(unique.contains("(Util.cmp$Ret.2)"));
    assert!(unique.contains("(Sys.init$Ret.0)"));
}

#[test]
fn eq_twice_gets_two_label_pairs() {
    let sources = vec![("Main".to_string(), "eq\neq\n".to_string())];
    let code = translate_sources(&sources, false, TranslatorOptions::default()).unwrap();
    assert_eq!(
        declared_labels(&code),
        vec!["(EQ.0$TRUE)", "(EQ.0$END)", "(EQ.1$TRUE)", "(EQ.1$END)"]
    );
}

#[test]
fn each_command_is_echoed_before_its_code() {
    let sources = vec![(
        "Main".to_string(),
        "  push constant 7 // seven\n\npop local 0\n".to_string(),
    )];
    let code = translate_sources(&sources, false, TranslatorOptions::default()).unwrap();
    assert_eq!(code[0], "// push constant 7");
    let pop = code.iter().position(|l| l == "// pop local 0").unwrap();
    assert!(pop > 1);

    let quiet = translate_sources(
        &sources,
        false,
        TranslatorOptions {
            echo_commands: false,
        },
    )
    .unwrap();
    assert!(quiet.iter().all(|l| !l.starts_with("//")));
}
