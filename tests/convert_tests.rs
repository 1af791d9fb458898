// tests/convert_tests.rs

use classad::{ConvertError, Value, old_to_new, parse_classad, parse_old};

#[test]
fn test_single_record() {
    let converted = old_to_new("MyType = \"Job\"\nCpus = 2\n").unwrap();
    assert_eq!(converted, "[\nMyType = \"Job\"\n;Cpus = 2\n]\n");
    let ad = parse_classad(converted.trim()).unwrap();
    assert_eq!(ad.eval_integer("Cpus"), Some(2));
}

#[test]
fn test_blank_lines_separate_records() {
    let ads = parse_old("A = 1\n\n\n\nB = 2\nC = B * 2\n").unwrap();
    assert_eq!(ads.len(), 2);
    assert_eq!(ads[0].evaluate_attr("A"), Value::Integer(1));
    assert_eq!(ads[1].evaluate_attr("C"), Value::Integer(4));
}

#[test]
fn test_comment_lines_are_kept() {
    let text = "// the job\nA = 1\n# not a comment\n";
    assert!(matches!(
        old_to_new(text),
        Err(ConvertError::MissingAssignment { line: 3 })
    ));

    let text = "// the job\nA = 1\n/* trailing */\nB = 2\n";
    let ads = parse_old(text).unwrap();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].len(), 2);
}

#[test]
fn test_block_comment_spans_blank_lines() {
    let text = "A = 1 /* starts here\n\nstill comment\n*/\nB = 2\n";
    let ads = parse_old(text).unwrap();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].evaluate_attr("B"), Value::Integer(2));
}

#[test]
fn test_assignment_after_leading_comment() {
    let ads = parse_old("/* note */ A = 1\nB = 2\n").unwrap();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].len(), 2);

    let converted = old_to_new("A = 1\n/* note */ B = 2\n").unwrap();
    assert_eq!(converted, "[\nA = 1\n/* note */ ;B = 2\n]\n");
    assert_eq!(parse_old("A = 1\n/* note */ B = 2\n").unwrap()[0].len(), 2);
}

#[test]
fn test_assignment_after_comment_closes() {
    let text = "A = 1 /* spans\ntwo lines */ B = A + 1\n";
    let converted = old_to_new(text).unwrap();
    assert_eq!(converted, "[\nA = 1 /* spans\ntwo lines */ ;B = A + 1\n]\n");
    let ads = parse_old(text).unwrap();
    assert_eq!(ads[0].evaluate_attr("B"), Value::Integer(2));
}

#[test]
fn test_comment_marker_inside_string() {
    let text = "Path = \"/*\"\n\nB = 2\n";
    let ads = parse_old(text).unwrap();
    assert_eq!(ads.len(), 2);
    assert_eq!(ads[0].eval_string("Path"), Some("/*".to_string()));
}

#[test]
fn test_comment_only_input() {
    assert_eq!(old_to_new("// nothing here\n\n").unwrap(), "");
    assert!(parse_old("").unwrap().is_empty());
}

#[test]
fn test_missing_assignment() {
    assert!(matches!(
        old_to_new("A = 1\nnonsense\n"),
        Err(ConvertError::MissingAssignment { line: 2 })
    ));
}

#[test]
fn test_bad_expression_is_parse_error() {
    assert!(matches!(parse_old("A = 1 +\n"), Err(ConvertError::Parse(_))));
}

#[test]
fn test_old_format_round_trip() {
    let ad = parse_classad("[Name = \"slot1\"; Cpus = 4; Memory = Cpus * 1024]").unwrap();
    let old = ad.to_old_format();
    assert_eq!(old, "Name = \"slot1\"\nCpus = 4\nMemory = (Cpus * 1024)\n");
    let back = parse_old(&old).unwrap();
    assert_eq!(back, vec![ad]);
}
