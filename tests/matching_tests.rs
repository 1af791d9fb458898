// tests/matching_tests.rs

use classad::matching::{RANK, REQUIREMENTS};
use classad::{ClassAd, EvalLimits, MatchClassAd, parse_classad};

fn job() -> ClassAd {
    parse_classad(
        r#"[
            MyType = "Job";
            Cpus = 2;
            Memory = 2048;
            Owner = "alice";
            Requirements = TARGET.Cpus >= MY.Cpus && TARGET.Memory >= Memory;
            Rank = TARGET.Memory / 1024
        ]"#,
    )
    .unwrap()
}

fn machine(cpus: i64, memory: i64) -> ClassAd {
    parse_classad(&format!(
        r#"[
            MyType = "Machine";
            Cpus = {cpus};
            Memory = {memory};
            Requirements = TARGET.Owner == "alice" || TARGET.Owner == "bob";
            Rank = TARGET.Cpus
        ]"#
    ))
    .unwrap()
}

#[test]
fn test_attribute_constants() {
    assert_eq!(REQUIREMENTS, "Requirements");
    assert_eq!(RANK, "Rank");
}

#[test]
fn test_compatible_pair_matches() {
    let job = job();
    let machine = machine(4, 8192);
    let pair = MatchClassAd::new(&job, &machine);
    assert!(pair.left_matches_right());
    assert!(pair.right_matches_left());
    assert!(pair.matches());
}

#[test]
fn test_match_is_symmetric() {
    let job = job();
    for machine in [machine(4, 8192), machine(1, 8192), machine(4, 1024)] {
        let forward = MatchClassAd::new(&job, &machine).matches();
        let backward = MatchClassAd::new(&machine, &job).matches();
        assert_eq!(forward, backward);
    }
}

#[test]
fn test_one_side_rejecting_fails_match() {
    let job = job();
    let small = machine(1, 8192);
    let pair = MatchClassAd::new(&job, &small);
    assert!(!pair.left_matches_right());
    assert!(pair.right_matches_left());
    assert!(!pair.matches());
}

#[test]
fn test_undefined_requirements_do_not_match() {
    let job = job();
    let bare = parse_classad("[Cpus = 8; Memory = 8192]").unwrap();
    let pair = MatchClassAd::new(&job, &bare);
    assert!(pair.left_matches_right());
    assert!(!pair.right_matches_left());
    assert!(!pair.matches());
}

#[test]
fn test_non_boolean_requirements_do_not_match() {
    let left = parse_classad("[Requirements = 1]").unwrap();
    let right = parse_classad("[Requirements = TARGET.Missing]").unwrap();
    let also = parse_classad("[Requirements = 1 / 0]").unwrap();
    assert!(!MatchClassAd::new(&left, &left).matches());
    assert!(!MatchClassAd::new(&right, &right).matches());
    assert!(!MatchClassAd::new(&also, &also).matches());
}

#[test]
fn test_ranks() {
    let job = job();
    let machine = machine(4, 8192);
    let pair = MatchClassAd::new(&job, &machine);
    assert_eq!(pair.evaluate_rank_left(), Some(8.0));
    assert_eq!(pair.evaluate_rank_right(), Some(2.0));

    let unranked = parse_classad("[Cpus = 1]").unwrap();
    let pair = MatchClassAd::new(&job, &unranked);
    assert_eq!(pair.evaluate_rank_right(), None);
}

#[test]
fn test_replacing_one_side() {
    let job = job();
    let small = machine(1, 1024);
    let big = machine(8, 16384);

    let mut pair = MatchClassAd::new(&job, &small);
    assert!(!pair.matches());

    pair.replace_right(&big);
    assert!(pair.matches());
    assert!(std::ptr::eq(pair.left(), &job));
    assert!(std::ptr::eq(pair.right(), &big));
    assert_eq!(pair.evaluate_rank_left(), Some(16.0));

    let stranger = parse_classad("[Owner = \"mallory\"; Cpus = 1; Memory = 1]").unwrap();
    pair.replace_left(&stranger);
    assert!(!pair.right_matches_left());
    assert!(std::ptr::eq(pair.right(), &big));
}

#[test]
fn test_matching_leaves_records_untouched() {
    let job = job();
    let machine = machine(4, 8192);
    let (job_before, machine_before) = (job.clone(), machine.clone());
    let _ = MatchClassAd::new(&job, &machine).matches();
    assert_eq!(job, job_before);
    assert_eq!(machine, machine_before);
    assert_eq!(job.evaluate_attr("Requirements"), classad::Value::Undefined);
}

#[test]
fn test_self_evaluating_requirements_do_not_match() {
    let left = parse_classad("[Requirements = eval(\"Requirements\")]").unwrap();
    let right = parse_classad("[Requirements = true]").unwrap();
    let pair = MatchClassAd::new(&left, &right).with_limits(EvalLimits::new().with_max_depth(32));
    assert!(!pair.matches());
}
