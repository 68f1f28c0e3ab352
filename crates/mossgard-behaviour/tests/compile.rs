//! Compilation and library-validation coverage for the tree grammar.

use mossgard_behaviour::leaves::paths;
use mossgard_behaviour::{
    Behaviour, BehaviourError, Compiler, CompositeKind, LeafKind, Registry, TreeLibrary,
};

fn compile(source: &str) -> Result<mossgard_behaviour::Node, BehaviourError> {
    let registry = Registry::build().expect("registry builds");
    Compiler::new(&registry).compile(source)
}

const PATROL: &str = "\
-?-
    -->
        check-direction
        move
    -->
        calculate-random-direction
        move
    wait
";

#[test]
fn compiles_nested_composites() {
    let root = compile(PATROL).unwrap();
    assert_eq!(root.tag(), "-?-");
    assert_eq!(root.line(), 1);
    let Behaviour::Composite { kind, children } = root.behaviour() else {
        panic!("expected a composite root");
    };
    assert_eq!(*kind, CompositeKind::Selector);
    assert_eq!(children.len(), 3);
    assert_eq!(children[1].tag(), "-->");
    assert_eq!(children[2].tag(), "wait");
    assert_eq!(children[2].line(), 8);
}

#[test]
fn recompilation_is_deterministic() {
    let first = compile(PATROL).unwrap();
    let second = compile(PATROL).unwrap();

    let mut first_rendered = String::new();
    first.visit(&mut |node| {
        first_rendered.push_str(&format!("{} {} {:?}\n", node.line(), node.tag(), node.arguments()));
    });
    let mut second_rendered = String::new();
    second.visit(&mut |node| {
        second_rendered
            .push_str(&format!("{} {} {:?}\n", node.line(), node.tag(), node.arguments()));
    });
    assert_eq!(first_rendered, second_rendered);
}

#[test]
fn comments_and_blank_lines_do_not_shift_line_numbers() {
    let source = "\
# patrol fallback
-->
    wait  # placeholder

    wait
";
    let root = compile(source).unwrap();
    let Behaviour::Composite { children, .. } = root.behaviour() else {
        panic!("expected a composite root");
    };
    assert_eq!(root.line(), 2);
    assert_eq!(children[0].line(), 3);
    assert_eq!(children[1].line(), 5);
}

#[test]
fn decorator_adopts_the_next_node_at_same_depth() {
    let source = "\
-->
    inverted
    find-neighbours
    wait
";
    let root = compile(source).unwrap();
    let Behaviour::Composite { children, .. } = root.behaviour() else {
        panic!("expected a composite root");
    };
    assert_eq!(children.len(), 2);
    let Behaviour::Decorator { child, .. } = children[0].behaviour() else {
        panic!("expected a decorator");
    };
    assert_eq!(child.tag(), "find-neighbours");
    assert_eq!(children[1].tag(), "wait");
}

#[test]
fn decorator_with_two_children_is_rejected() {
    let source = "\
inverted
    wait
    wait
";
    let error = compile(source).unwrap_err();
    assert!(matches!(
        error,
        BehaviourError::DecoratorExtraChild { line: 3, .. }
    ));
    assert!(error.to_string().contains("can have only one child"));
}

#[test]
fn bare_decorator_is_rejected() {
    let error = compile("-->\n    wait\n    inverted\n").unwrap_err();
    assert!(matches!(
        error,
        BehaviourError::DecoratorWithoutChild { line: 3, .. }
    ));
}

#[test]
fn empty_composite_is_rejected() {
    let error = compile("-?-\n").unwrap_err();
    assert!(matches!(
        error,
        BehaviourError::CompositeWithoutChildren { line: 1, .. }
    ));
}

#[test]
fn leaf_with_a_child_is_rejected() {
    let source = "\
-->
    wait
        wait
";
    let error = compile(source).unwrap_err();
    assert!(matches!(
        error,
        BehaviourError::LeafWithChildren { line: 3, .. }
    ));
}

#[test]
fn indentation_errors_carry_one_based_lines() {
    let source = "\
-->
    wait
   wait
";
    let error = compile(source).unwrap_err();
    assert!(matches!(error, BehaviourError::BadIndentation { line: 3 }));
    assert!(error.to_string().contains("line 3"));

    let error = compile("-->\n\twait\n").unwrap_err();
    assert!(matches!(error, BehaviourError::TabIndentation { line: 2 }));

    let error = compile("-->\n        wait\n").unwrap_err();
    assert!(matches!(error, BehaviourError::IndentJump { line: 2 }));

    let error = compile("    wait\n").unwrap_err();
    assert!(matches!(error, BehaviourError::UnexpectedIndent { line: 1 }));
}

#[test]
fn second_root_is_rejected() {
    let error = compile("wait\nwait\n").unwrap_err();
    assert!(matches!(error, BehaviourError::MultipleRoots { line: 2 }));
}

#[test]
fn unknown_tag_is_rejected() {
    let error = compile("-->\n    explode\n").unwrap_err();
    match error {
        BehaviourError::UnknownTag { line, tag } => {
            assert_eq!(line, 2);
            assert_eq!(tag, "explode");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_source_is_rejected() {
    assert!(matches!(
        compile("# only a comment\n"),
        Err(BehaviourError::EmptySource)
    ));
}

#[test]
fn memory_clauses_rewire_leaf_slots() {
    let source = "\
-->
    find-around 3 2 -> scouting.seen
    inspect any hp < 50% <- scouting.seen -> scouting.weakest
    check-direction <- self.position
";
    let root = compile(source).unwrap();
    let Behaviour::Composite { children, .. } = root.behaviour() else {
        panic!("expected a composite root");
    };

    let Behaviour::Leaf(find) = children[0].behaviour() else {
        panic!("expected a leaf");
    };
    assert_eq!(find.output().map(ToString::to_string).as_deref(), Some("scouting.seen"));

    let Behaviour::Leaf(inspect) = children[1].behaviour() else {
        panic!("expected a leaf");
    };
    let input = inspect.input().expect("inspect reads memory");
    assert!(input.in_blackboard);
    assert_eq!(input.path.to_string(), "scouting.seen");
    assert_eq!(
        inspect.output().map(ToString::to_string).as_deref(),
        Some("scouting.weakest")
    );

    let Behaviour::Leaf(check) = children[2].behaviour() else {
        panic!("expected a leaf");
    };
    let input = check.input().expect("check-direction reads memory");
    assert!(!input.in_blackboard);
    assert_eq!(input.path.to_string(), "position");
}

#[test]
fn default_memory_wiring_matches_the_catalogue() {
    let root = compile("-->\n    find-neighbours\n    select-first\n").unwrap();
    let Behaviour::Composite { children, .. } = root.behaviour() else {
        panic!("expected a composite root");
    };
    let Behaviour::Leaf(find) = children[0].behaviour() else {
        panic!("expected a leaf");
    };
    assert_eq!(
        find.output().map(ToString::to_string).as_deref(),
        Some(paths::FOUND_ACTORS)
    );
    let Behaviour::Leaf(select) = children[1].behaviour() else {
        panic!("expected a leaf");
    };
    assert_eq!(
        select.input().map(|slot| slot.path.to_string()).as_deref(),
        Some(paths::FOUND_ACTORS)
    );
    assert_eq!(
        select.output().map(ToString::to_string).as_deref(),
        Some(paths::SELECTED_ACTOR)
    );
}

#[test]
fn memory_clause_on_composite_is_rejected() {
    let error = compile("--> -> somewhere\n    wait\n").unwrap_err();
    assert!(matches!(error, BehaviourError::MemoryOnNonLeaf { line: 1 }));
}

#[test]
fn dangling_memory_marker_is_rejected() {
    let error = compile("-->\n    move <-\n").unwrap_err();
    assert!(matches!(
        error,
        BehaviourError::MissingMemoryPath { line: 2, .. }
    ));
}

#[test]
fn argument_errors_are_compile_time() {
    let error = compile("-->\n    inspect self hp <> 3\n").unwrap_err();
    assert!(error.to_string().contains("unknown operator"));

    let error = compile("-->\n    inspect any faction == 50%\n").unwrap_err();
    assert!(error.to_string().contains("percentage"));

    let error = compile("-->\n    find-around 3 2 1\n").unwrap_err();
    assert!(matches!(
        error,
        BehaviourError::WrongArgumentCount { line: 2, .. }
    ));

    let error = compile("-->\n    prepare-to-battle flight\n").unwrap_err();
    assert!(error.to_string().contains("unknown battle kind"));
}

#[test]
fn converted_parses_statuses() {
    let source = "\
converted failure running
    wait
";
    let root = compile(source).unwrap();
    assert_eq!(root.tag(), "converted");
    assert!(matches!(root.behaviour(), Behaviour::Decorator { .. }));

    let error = compile("converted failure victory\n    wait\n").unwrap_err();
    assert!(error.to_string().contains("unknown status"));
}

#[test]
fn include_targets_are_validated_at_load_time() {
    let error = TreeLibrary::from_sources([("goblin", "include ghost\n")]).unwrap_err();
    match error {
        BehaviourError::UnknownInclude { tree, line, target } => {
            assert_eq!(tree, "goblin");
            assert_eq!(line, 1);
            assert_eq!(target, "ghost");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn include_cycles_are_rejected() {
    let error = TreeLibrary::from_sources([
        ("alpha", "include beta\n"),
        ("beta", "include alpha\n"),
    ])
    .unwrap_err();
    let BehaviourError::IncludeCycle { chain } = error else {
        panic!("expected an include cycle");
    };
    assert!(chain.contains("alpha") && chain.contains("beta"));

    let error = TreeLibrary::from_sources([("solo", "include solo\n")]).unwrap_err();
    assert!(matches!(error, BehaviourError::IncludeCycle { .. }));
}

#[test]
fn tree_names_fold_case() {
    let library = TreeLibrary::from_sources([("Goblin", "wait\n")]).unwrap();
    assert!(library.get("goblin").is_ok());
    assert!(library.get("GOBLIN").is_ok());
    assert!(matches!(
        library.get("orc"),
        Err(BehaviourError::TreeNotFound { .. })
    ));
}

#[test]
fn acyclic_include_chains_load() {
    let library = TreeLibrary::from_sources([
        ("top", "-->\n    include middle\n    wait\n"),
        ("middle", "include bottom\n"),
        ("bottom", "wait\n"),
    ])
    .unwrap();
    assert_eq!(library.len(), 3);
}
