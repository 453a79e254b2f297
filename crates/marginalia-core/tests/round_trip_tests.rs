//! Round-trip tests over generated examples
//!
//! Every template is expanded four ways: own-line or end-of-line
//! comments after each line, with or without a leading comment.

use marginalia_core::{
    DirectiveFamily, DumpOptions, Node, NodeKind, PlainUnparser, RoundTripValidator, SpanRetention,
    dump, flatten, parse, parse_module, trivia_tokens, unparse,
};

const COMMENTS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

const TEMPLATES: &[(&str, &str)] = &[
    ("empty", ""),
    ("1 assignment", "a = 1"),
    ("3 assignments", "a = 1\nb = 2\nc = 3"),
    ("inline empty list", "[]"),
    ("empty list", "[\n    ]"),
    ("inline 1-elem list", "[1]"),
    ("inline 3-elem list", "[1, 2, 3]"),
    ("3-elem list", "[\n    1,\n    2,\n    3\n    ]"),
    ("inline 1-elem set", "{1}"),
    ("1-elem set", "{\n    1\n    }"),
    ("inline 3-elem set", "{1, 2, 3}"),
    ("3-elem set", "{\n    1,\n    2,\n    3\n    }"),
    ("inline empty dict", "{}"),
    ("empty dict", "{\n    }"),
    ("inline dict", "{'a': 1, 'b': 2, 'c': 3}"),
    ("dict", "{\n    'a': 1,\n    'b': 2,\n    'c': 3\n    }"),
    ("inline call", "call(1, 2, 3)"),
    ("call", "call(\n    1,\n    2,\n    3\n    )"),
    ("inline call with kwargs", "call(1, 2, 3, a=1, b=2, c=3)"),
    (
        "call with kwargs",
        "call(\n    1,\n    2,\n    3,\n    a=1,\n    b=2,\n    c=3\n    )",
    ),
    ("inline function definition", "def fun(): pass"),
    ("function definition", "def fun(\n        ):\n    pass"),
    (
        "function definition with args",
        "def fun(\n        a,\n        b\n        ):\n    pass",
    ),
    (
        "function definition with kwargs",
        "def fun(\n        a,\n        b,\n        c=3,\n        d=4\n        ):\n    pass",
    ),
    (
        "function definition with star-args",
        "def fun(\n        a,\n        b,\n        c=3,\n        d=4,\n        *args\n        ):\n    pass",
    ),
    (
        "function definition with star-kwargs",
        "def fun(\n        a,\n        b,\n        *args,\n        c=3,\n        d=4,\n        **kwargs\n        ):\n    pass",
    ),
];

struct Example {
    name: String,
    source: String,
}

fn examples() -> Vec<Example> {
    let mut examples = Vec::new();
    for (name, template) in TEMPLATES {
        for leading in [false, true] {
            for end_of_line in [false, true] {
                let mut lines = Vec::new();
                if leading {
                    lines.push("# zero".to_string());
                }
                for (line, comment) in template.lines().zip(COMMENTS) {
                    if end_of_line {
                        lines.push(format!("{line}  # {comment}"));
                    } else {
                        lines.push(line.to_string());
                        lines.push(format!("# {comment}"));
                    }
                }
                examples.push(Example {
                    name: format!(
                        "{name} with{} comments{}",
                        if end_of_line { " eol" } else { "" },
                        if leading { " and starting comment" } else { "" }
                    ),
                    source: lines.join("\n") + "\n",
                });
            }
        }
    }
    examples
}

fn structure(tree: &Node) -> String {
    dump(tree, DumpOptions::default())
}

#[test]
fn test_examples_cover_every_template() {
    assert_eq!(examples().len(), TEMPLATES.len() * 4);
}

#[test]
fn test_round_trip_without_trivia() {
    for example in examples() {
        let tree = parse_module(&example.source, SpanRetention::Native).unwrap();
        let code = PlainUnparser::default().unparse(&tree);
        let reparsed = parse_module(&code, SpanRetention::Native)
            .unwrap_or_else(|err| panic!("{}: {err}\n{code}", example.name));
        assert_eq!(
            dump(&reparsed, DumpOptions::without_trivia()),
            dump(&tree, DumpOptions::without_trivia()),
            "{}",
            example.name
        );
    }
}

#[test]
fn test_round_trip_with_trivia() {
    for example in examples() {
        let complete = parse(&example.source)
            .unwrap_or_else(|err| panic!("{}: {err}", example.name));
        let plain_code = PlainUnparser::default().unparse(&complete);
        let complete_code = unparse(&complete);
        assert!(
            complete_code.len() >= plain_code.len(),
            "{}: {complete_code:?} vs {plain_code:?}",
            example.name
        );

        let reparsed = parse(&complete_code).unwrap_or_else(|err| {
            panic!(
                "{}: invalid syntax after inserting comments: {err}\n{complete_code}",
                example.name
            )
        });
        assert_eq!(
            flatten(&reparsed, false).len(),
            flatten(&complete, false).len(),
            "{}\n{complete_code}",
            example.name
        );
        assert_eq!(
            structure(&reparsed),
            structure(&complete),
            "{}\n\"\"\"\n{complete_code}\"\"\" vs. original \"\"\"\n{}\"\"\"",
            example.name,
            example.source
        );
    }
}

#[test]
fn test_count_invariant() {
    for example in examples() {
        let plain = parse_module(&example.source, SpanRetention::Native).unwrap();
        let tokens = trivia_tokens(&example.source).unwrap();
        let complete = parse(&example.source).unwrap();
        assert_eq!(
            flatten(&complete, false).len(),
            flatten(&plain, false).len() + tokens.len(),
            "{}",
            example.name
        );
    }
}

#[test]
fn test_validator_accepts_every_example() {
    let validator = RoundTripValidator::new();
    for example in examples() {
        let result = validator.validate(&example.source).unwrap();
        assert!(result.is_valid(), "{}: {:?}", example.name, result.issues());
    }
}

fn trivia_of(tree: &Node) -> Vec<&Node> {
    flatten(tree, false)
        .into_iter()
        .filter(|node| node.is_trivia())
        .collect()
}

#[test]
fn test_end_of_line_flags() {
    let tree = parse("x = 1  # trailing\n# own line\ny = 2\n").unwrap();
    let flags: Vec<_> = trivia_of(&tree)
        .into_iter()
        .map(|node| match &node.kind {
            NodeKind::Comment(comment) => comment.end_of_line,
            _ => panic!("expected a comment"),
        })
        .collect();
    assert_eq!(flags, vec![true, false]);
}

#[test]
fn test_classification_through_the_pipeline() {
    let tree = parse("#pragma: omp parallel for\n#pragmatic\n# if you want\nx = 1\n").unwrap();
    let kinds: Vec<_> = trivia_of(&tree).into_iter().map(Node::kind_name).collect();
    assert_eq!(kinds, vec!["OpenMpPragma", "Comment", "Comment"]);

    let NodeKind::Directive(directive) = &trivia_of(&tree)[0].kind else {
        panic!("expected a directive");
    };
    assert_eq!(directive.family, DirectiveFamily::OpenMpPragma);
    assert_eq!(directive.prefix, vec!["pragma", "omp", "parallel", "for"]);
    assert!(directive.marker.colon);
}

#[test]
fn test_unknown_marker_stays_a_comment() {
    let tree = parse("#region setup\nx = 1\n").unwrap();
    let trivia = trivia_of(&tree);
    assert_eq!(trivia.len(), 1);
    assert!(matches!(
        &trivia[0].kind,
        NodeKind::Comment(comment) if comment.payload == "region setup"
    ));
}

#[test]
fn test_same_slot_keeps_source_order() {
    let source = "call(\n    1,\n    # a\n    # b\n    # c\n    2)\n";
    let tree = parse(source).unwrap();
    let payloads: Vec<_> = trivia_of(&tree)
        .into_iter()
        .filter_map(|node| match &node.kind {
            NodeKind::Comment(comment) => Some(comment.payload.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(payloads, vec![" a", " b", " c"]);
    insta::assert_snapshot!(unparse(&tree), @r"
    call(1,
        # a
        # b
        # c
        2)
    ");
}

#[test]
fn test_empty_tree() {
    let tree = parse("").unwrap();
    assert_eq!(structure(&tree), "Module(body=[])");
    assert_eq!(unparse(&tree), "");

    let tree = parse("# only a comment\n").unwrap();
    assert_eq!(
        structure(&tree),
        r#"Module(body=[Comment(payload=" only a comment", eol=false)])"#
    );
    assert_eq!(unparse(&tree), "# only a comment\n");
}
