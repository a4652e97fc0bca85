use super::args::CliArgs;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn units_are_positional() {
    let args = CliArgs::try_parse_from(["ptrsafe", "a.json", "b.json"]).expect("parse");
    assert_eq!(
        args.units,
        vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
    );
    assert!(args.config.is_none());
    assert!(!args.no_merge_decls);
    assert!(args.allow_extern.is_empty());
    assert!(args.output.is_none());
}

#[test]
fn at_least_one_unit_is_required() {
    assert!(CliArgs::try_parse_from(["ptrsafe"]).is_err());
}

#[test]
fn allow_extern_repeats() {
    let args = CliArgs::try_parse_from([
        "ptrsafe",
        "--allow-extern",
        "strlen",
        "--allow-extern",
        "memcpy",
        "a.json",
    ])
    .expect("parse");
    assert_eq!(args.allow_extern, vec!["strlen", "memcpy"]);
}

#[test]
fn overrides_and_output() {
    let args = CliArgs::try_parse_from([
        "ptrsafe",
        "--no-merge-decls",
        "--max-repair-iterations",
        "3",
        "-c",
        "opts.json",
        "-o",
        "out.json",
        "--pretty",
        "a.json",
    ])
    .expect("parse");
    assert!(args.no_merge_decls);
    assert_eq!(args.max_repair_iterations, Some(3));
    assert_eq!(args.config, Some(PathBuf::from("opts.json")));
    assert_eq!(args.output, Some(PathBuf::from("out.json")));
    assert!(args.pretty);
}
